use cosmwasm_std::{Addr, Coin, Timestamp};
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};
use sha3::{Digest, Sha3_256};

use htlc_escrow_contract::msg::{
    ConfigResponse, CreationRequestResponse, EscrowAddressResponse, EscrowsResponse, ExecuteMsg,
    InstantiateMsg, MerkleIndexResponse, MultiFillInfo, QueryMsg, TimelockOffsets,
};
use htlc_escrow_contract::primitives::{Hash32, Role};
use htlc_escrow_contract::state::CreationStatus;

fn escrow_contract() -> Box<dyn Contract<cosmwasm_std::Empty>> {
    Box::new(ContractWrapper::new(
        htlc_escrow_contract::execute,
        htlc_escrow_contract::instantiate,
        htlc_escrow_contract::query,
    ))
}

fn mock_app() -> App {
    App::new(|router, _api, storage| {
        for who in ["owner", "maker", "taker", "relayer", "anyone"] {
            router
                .bank
                .init_balance(
                    storage,
                    &Addr::unchecked(who),
                    vec![Coin::new(1_000_000, "uusdc"), Coin::new(1_000_000, "uatom")],
                )
                .unwrap();
        }
    })
}

fn setup(app: &mut App) -> Addr {
    let id = app.store_code(escrow_contract());
    let msg = InstantiateMsg {
        owner: "owner".into(),
        factory_id: "factory-1".into(),
        src_rescue_delay: 1_000,
        dst_rescue_delay: 1_000,
        fee_bank: "fee-bank".into(),
        access_token: "access-token".into(),
        access_token_threshold: 1_000,
        resolver_fee: 0,
        whitelist_discount_numerator: 0,
    };
    app.instantiate_contract(id, Addr::unchecked("owner"), &msg, &[], "htlc-escrow", None)
        .unwrap()
}

fn sha3_hash(bytes: &[u8]) -> Hash32 {
    let mut hasher = Sha3_256::new();
    hasher.update(bytes);
    Hash32::from_slice(&hasher.finalize()).unwrap()
}

fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    let (lo, hi) = if a.as_bytes() <= b.as_bytes() { (a, b) } else { (b, a) };
    let mut buf = Vec::new();
    buf.extend_from_slice(lo.as_bytes());
    buf.extend_from_slice(hi.as_bytes());
    sha3_hash(&buf)
}

fn leaf_hash(index: u64, secret_hash: &Hash32) -> Hash32 {
    let mut buf = Vec::new();
    buf.extend_from_slice(&index.to_le_bytes());
    buf.extend_from_slice(secret_hash.as_bytes());
    sha3_hash(&buf)
}

fn attr<'a>(resp: &'a AppResponse, key: &str) -> &'a str {
    resp.events
        .iter()
        .find_map(|e| e.attributes.iter().find(|a| a.key == key))
        .map(|a| a.value.as_str())
        .unwrap_or_else(|| panic!("attribute {key} not found in response {resp:?}"))
}

fn timelocks() -> TimelockOffsets {
    TimelockOffsets {
        src_withdrawal: 10,
        src_public_withdrawal: 120,
        src_cancellation: 121,
        src_public_cancellation: 122,
        dst_withdrawal: 10,
        dst_public_withdrawal: 100,
        dst_cancellation: 101,
    }
}

fn packed_hashlock_info(root: &Hash32, parts: u16) -> Hash32 {
    let mut bytes = [0u8; 32];
    bytes[0..30].copy_from_slice(&root.as_bytes()[0..30]);
    bytes[30..32].copy_from_slice(&parts.to_be_bytes());
    Hash32(bytes)
}

fn create_single_fill_source(app: &mut App, contract: &Addr, order_hash: Hash32, hashlock: Hash32) -> AppResponse {
    let post_interaction = ExecuteMsg::PostInteraction {
        order_hash,
        hashlock_info: hashlock,
        maker: "maker".into(),
        taker: "taker".into(),
        token_id: "native:uusdc".into(),
        making_amount: 1_000,
        taking_amount: 1_000,
        remaining_making_amount: 1_000,
        timelocks: timelocks(),
        deposits: (200u128 << 64) | 200u128,
        dst_chain_id: "dst-1".into(),
        dst_token_id: "native:uusdc".into(),
        dst_amount: 1_000,
        multi_fill: None::<MultiFillInfo>,
        whitelist: vec!["taker".into()],
        access_token_balance: 0,
    };
    app.execute_contract(
        Addr::unchecked("relayer"),
        contract.clone(),
        &post_interaction,
        &[Coin::new(1_000, "uusdc"), Coin::new(200, "uatom")],
    )
    .unwrap()
}

#[test]
fn query_config_reports_every_instantiated_field() {
    let mut app = mock_app();
    let contract = setup(&mut app);

    let config: ConfigResponse = app.wrap().query_wasm_smart(contract, &QueryMsg::Config {}).unwrap();
    assert_eq!(config.owner, "owner");
    assert_eq!(config.factory_id, "factory-1");
    assert_eq!(config.src_rescue_delay, 1_000);
    assert_eq!(config.dst_rescue_delay, 1_000);
    assert_eq!(config.fee_bank, "fee-bank");
    assert_eq!(config.access_token, "access-token");
    assert_eq!(config.access_token_threshold, 1_000);
    assert_eq!(config.resolver_fee, 0);
    assert_eq!(config.whitelist_discount_numerator, 0);
    assert_eq!(config.num_src_created, 0);
    assert_eq!(config.num_dst_created, 0);
}

#[test]
fn address_of_escrow_preview_matches_the_address_actually_created() {
    let mut app = mock_app();
    let contract = setup(&mut app);
    app.update_block(|b| b.time = Timestamp::from_seconds(1_700_000_000));

    let hashlock = sha3_hash(b"address_preview_consistency_test_secret");
    let preview: EscrowAddressResponse = app
        .wrap()
        .query_wasm_smart(
            contract.clone(),
            &QueryMsg::AddressOfEscrow {
                order_hash: Hash32([30u8; 32]),
                hashlock,
                maker: "maker".into(),
                taker: "taker".into(),
                token_id: "native:uusdc".into(),
                amount: 1_000,
                safety_deposit: 200,
                timelocks: timelocks(),
                deployed_at: 1_700_000_000,
                role: Role::Source,
            },
        )
        .unwrap();

    let resp = create_single_fill_source(&mut app, &contract, Hash32([30u8; 32]), hashlock);
    assert_eq!(attr(&resp, "address"), preview.address);
}

#[test]
fn escrows_listing_paginates_by_address() {
    let mut app = mock_app();
    let contract = setup(&mut app);
    app.update_block(|b| b.time = Timestamp::from_seconds(1_700_000_000));

    for i in 0..3u8 {
        let hashlock = sha3_hash(format!("pagination_test_secret_{i}").as_bytes());
        create_single_fill_source(&mut app, &contract, Hash32([40 + i; 32]), hashlock);
    }

    let all: EscrowsResponse = app
        .wrap()
        .query_wasm_smart(contract.clone(), &QueryMsg::Escrows { start_after: None, limit: None })
        .unwrap();
    assert_eq!(all.escrows.len(), 3);

    let first_page: EscrowsResponse = app
        .wrap()
        .query_wasm_smart(contract.clone(), &QueryMsg::Escrows { start_after: None, limit: Some(1) })
        .unwrap();
    assert_eq!(first_page.escrows.len(), 1);

    let second_page: EscrowsResponse = app
        .wrap()
        .query_wasm_smart(
            contract,
            &QueryMsg::Escrows { start_after: Some(first_page.escrows[0].address.clone()), limit: None },
        )
        .unwrap();
    assert_eq!(second_page.escrows.len(), 2);
    assert_ne!(second_page.escrows[0].address, first_page.escrows[0].address);
}

#[test]
fn pre_interaction_creation_request_is_queryable_and_updates_on_fill() {
    let mut app = mock_app();
    let contract = setup(&mut app);
    app.update_block(|b| b.time = Timestamp::from_seconds(1_700_000_000));

    let order_hash = Hash32([50u8; 32]);
    let hashlock = sha3_hash(b"creation_request_lifecycle_test_secret");

    app.execute_contract(
        Addr::unchecked("relayer"),
        contract.clone(),
        &ExecuteMsg::PreInteraction {
            order_hash,
            hashlock_info: hashlock,
            taker: "taker".into(),
            making_amount: 1_000,
            taking_amount: 1_000,
            remaining_making_amount: 1_000,
        },
        &[],
    )
    .unwrap();

    let pending: CreationRequestResponse = app
        .wrap()
        .query_wasm_smart(contract.clone(), &QueryMsg::CreationRequest { order_hash, hashlock })
        .unwrap();
    assert!(matches!(pending.status, CreationStatus::Pending));
    assert!(pending.escrow_address.is_none());

    let resp = create_single_fill_source(&mut app, &contract, order_hash, hashlock);
    let address = attr(&resp, "address").to_string();

    let fulfilled: CreationRequestResponse = app
        .wrap()
        .query_wasm_smart(contract, &QueryMsg::CreationRequest { order_hash, hashlock })
        .unwrap();
    assert!(matches!(fulfilled.status, CreationStatus::Created));
    assert_eq!(fulfilled.escrow_address, Some(address));
}

#[test]
fn multi_fill_order_accepts_a_sequence_of_partial_fills() {
    let mut app = mock_app();
    let contract = setup(&mut app);
    app.update_block(|b| b.time = Timestamp::from_seconds(1_700_000_000));

    let order_hash = Hash32([60u8; 32]);
    let secret_hashes: Vec<Hash32> = (0..4u64).map(|i| sha3_hash(format!("multi-fill-secret-{i}").as_bytes())).collect();
    let leaves: Vec<Hash32> = secret_hashes.iter().enumerate().map(|(i, sh)| leaf_hash(i as u64, sh)).collect();
    let node01 = hash_pair(&leaves[0], &leaves[1]);
    let node23 = hash_pair(&leaves[2], &leaves[3]);
    let root = hash_pair(&node01, &node23);
    let hashlock_info = packed_hashlock_info(&root, 4);

    // First fill: a quarter of the order, validates leaf index 1.
    let first_fill = ExecuteMsg::PostInteraction {
        order_hash,
        hashlock_info,
        maker: "maker".into(),
        taker: "taker".into(),
        token_id: "native:uusdc".into(),
        making_amount: 250,
        taking_amount: 250,
        remaining_making_amount: 1_000,
        timelocks: timelocks(),
        deposits: (50u128 << 64) | 50u128,
        dst_chain_id: "dst-1".into(),
        dst_token_id: "native:uusdc".into(),
        dst_amount: 250,
        multi_fill: Some(MultiFillInfo {
            root,
            proof: vec![leaves[0], node23],
            leaf_index: 1,
            secret_hash: secret_hashes[1],
            parts: 4,
            order_making_amount: 1_000,
            remaining_making_amount_before: 1_000,
        }),
        whitelist: vec!["taker".into()],
        access_token_balance: 0,
    };
    app.execute_contract(
        Addr::unchecked("relayer"),
        contract.clone(),
        &first_fill,
        &[Coin::new(250, "uusdc"), Coin::new(50, "uatom")],
    )
    .unwrap();

    let index_after_first: MerkleIndexResponse = app
        .wrap()
        .query_wasm_smart(contract.clone(), &QueryMsg::MerkleIndexEntry { order_hash, root })
        .unwrap();
    assert_eq!(index_after_first.next_expected_index, 2);
    assert_eq!(index_after_first.last_validated_secret_hash, Some(secret_hashes[1]));

    // Second fill: another quarter, remaining_making drops to 750 and
    // validates leaf index 2.
    let second_fill = ExecuteMsg::PostInteraction {
        order_hash,
        hashlock_info,
        maker: "maker".into(),
        taker: "taker".into(),
        token_id: "native:uusdc".into(),
        making_amount: 250,
        taking_amount: 250,
        remaining_making_amount: 750,
        timelocks: timelocks(),
        deposits: (50u128 << 64) | 50u128,
        dst_chain_id: "dst-1".into(),
        dst_token_id: "native:uusdc".into(),
        dst_amount: 250,
        multi_fill: Some(MultiFillInfo {
            root,
            proof: vec![leaves[3], node01],
            leaf_index: 2,
            secret_hash: secret_hashes[2],
            parts: 4,
            order_making_amount: 1_000,
            remaining_making_amount_before: 750,
        }),
        whitelist: vec!["taker".into()],
        access_token_balance: 0,
    };
    let resp = app
        .execute_contract(
            Addr::unchecked("relayer"),
            contract.clone(),
            &second_fill,
            &[Coin::new(250, "uusdc"), Coin::new(50, "uatom")],
        )
        .unwrap();
    assert!(!attr(&resp, "address").is_empty());

    let index_after_second: MerkleIndexResponse = app
        .wrap()
        .query_wasm_smart(contract, &QueryMsg::MerkleIndexEntry { order_hash, root })
        .unwrap();
    assert_eq!(index_after_second.next_expected_index, 3);
    assert_eq!(index_after_second.last_validated_secret_hash, Some(secret_hashes[2]));
}

#[test]
fn rescue_sweeps_a_foreign_denom_the_escrow_never_tracked() {
    let mut app = mock_app();
    let contract = setup(&mut app);
    app.update_block(|b| b.time = Timestamp::from_seconds(1_700_000_000));

    let secret = b"rescue_sweep_test_secret_for_escrow_lc";
    let hashlock = sha3_hash(secret);
    let resp = create_single_fill_source(&mut app, &contract, Hash32([80u8; 32]), hashlock);
    let address = attr(&resp, "address").to_string();

    // Simulate a stray transfer of an unrelated native denom landing on the
    // contract, never accounted for in `principal_balance`/`deposit_balance`.
    app.send_tokens(Addr::unchecked("anyone"), contract.clone(), &[Coin::new(777, "uusdc")])
        .unwrap();

    app.update_block(|b| b.time = Timestamp::from_seconds(1_700_001_500));
    let taker_before = app.wrap().query_balance("taker", "uusdc").unwrap().amount;
    app.execute_contract(
        Addr::unchecked("taker"),
        contract,
        &ExecuteMsg::Rescue { address, token_id: "native:uusdc".into(), amount: 777 },
        &[],
    )
    .unwrap();
    let taker_after = app.wrap().query_balance("taker", "uusdc").unwrap().amount;
    assert_eq!(taker_after - taker_before, cosmwasm_std::Uint128::new(777));
}
