//! End-to-end flows across the stealth scheme, the shielded pool, the
//! local tree mirror, and the proof pipeline mocks.

use alloy::primitives::{
    Address,
    B256,
    U256,
};
use veilpool::{
    adapters::{
        memory_store::NoteStore,
        merkle_tree::PoolTree,
        mock_chain::MockChain,
        mock_prover::{
            MockProver,
            MockVerifier,
        },
        reconcile::{
            expect_root,
            rebuild_from_events,
            reconcile_store,
        },
    },
    crypto::kdf::derive_keys,
    domain::{
        announcement::{
            Announcement,
            AnnouncementPayload,
        },
        note::asset_id,
        scan::Scanner,
        stealth::{
            generate_stealth_payment,
            recover_stealth_private_key,
        },
        witness::{
            build_inputs,
            check_signals,
            validate_bundle,
            ProofSystem,
        },
    },
    error::CoreError,
    ports::{
        chain::{
            ChainReader,
            SyncCursor,
        },
        prover::Prover,
    },
    KeyPair,
    Note,
    Operation,
};

const CHAIN_ID: u64 = 11155111;

fn recipient_keys() -> KeyPair {
    derive_keys("0xsigned-login-challenge", "482913").unwrap()
}

fn token() -> Address {
    Address::repeat_byte(0x11)
}

#[test]
fn stealth_payment_lifecycle() {
    let keys = recipient_keys();
    let meta = keys.meta_address();

    // Sender side: derive a one-time address and publish the announcement.
    let payment = generate_stealth_payment(&meta).unwrap();
    let payload = AnnouncementPayload::Erc20Transfer {
        chain_id: CHAIN_ID as u32,
        token: token(),
        amount: U256::from(10_000_000_000_000_000u64),
    };
    let log = vec![
        Announcement::new(
            &generate_stealth_payment(&derive_keys("0xother", "0000").unwrap().meta_address())
                .unwrap(),
            &AnnouncementPayload::None,
        ),
        Announcement::new(&payment, &payload),
    ];

    // Recipient side: scan, detect, recover the one-time key.
    let mut scanner = Scanner::new(keys.clone());
    let matches = scanner.scan(&log);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].index, 1);
    assert_eq!(matches[0].stealth_address, payment.stealth_address);
    assert_eq!(matches[0].payload, payload);

    let recovered = recover_stealth_private_key(&keys, &matches[0].ephemeral_pubkey).unwrap();
    // The recovered scalar controls the announced address, and doubles as a
    // shielded-pool identity.
    assert_ne!(recovered.owner(), B256::ZERO);

    // A session restart derives identical keys and misses nothing.
    let keys_again = recipient_keys();
    let mut resumed = Scanner::with_cursor(keys_again, 0);
    assert_eq!(resumed.scan(&log).len(), 1);
}

#[tokio::test]
async fn deposit_proof_pipeline() {
    let keys = recipient_keys();
    let spending = keys.spending.clone();
    let asset = asset_id(CHAIN_ID, token());

    let output = Note::new(
        spending.owner(),
        U256::from(10_000_000_000_000_000u64),
        asset,
        CHAIN_ID,
    )
    .unwrap();
    let operation = Operation::deposit(output.clone(), None).unwrap();
    assert_eq!(operation.public_amount, 10_000_000_000_000_000i128);

    let tree = PoolTree::new();
    let inputs = build_inputs(
        &spending,
        &operation,
        vec![],
        tree.root(),
        ProofSystem::Groth16,
    )
    .unwrap();

    // Deposits spend nothing: both nullifier slots are zero, the second
    // output slot is the canonical dummy commitment.
    assert_eq!(inputs.public.nullifiers, [B256::ZERO, B256::ZERO]);
    assert_eq!(inputs.public.output_commitments[0], output.commitment().0);
    assert_eq!(
        inputs.public.output_commitments[1],
        Note::dummy().commitment().0
    );

    let bundle = MockProver.prove(&inputs).await.unwrap();
    validate_bundle(&bundle, &inputs.public, ProofSystem::Groth16, &MockVerifier)
        .await
        .unwrap();

    // A tampered signal is caught positionally before any submission.
    let mut tampered = bundle.clone();
    tampered.public_signals[3] = B256::repeat_byte(0xEE);
    let err = check_signals(&tampered, &inputs.public, ProofSystem::Groth16).unwrap_err();
    assert!(matches!(err, CoreError::ProofSignalMismatch { index: 3, .. }));
}

#[tokio::test]
async fn withdraw_against_synced_tree() {
    let keys = recipient_keys();
    let spending = keys.spending.clone();
    let asset = asset_id(CHAIN_ID, token());

    let deposited = Note::new(spending.owner(), U256::from(1_000u64), asset, CHAIN_ID).unwrap();

    // Another user's deposit lands in the same block, before ours.
    let chain = MockChain::new();
    chain.submit_deposits_in_block(&[B256::repeat_byte(0xAA), deposited.commitment().0]);

    // Mirror the chain locally and cross-check the root.
    let events = chain.deposit_events(SyncCursor::default()).await.unwrap();
    let tree = rebuild_from_events(&events).unwrap();
    expect_root(&tree, chain.pool_root().await.unwrap()).unwrap();

    // Withdraw 750, keep 250 as change.
    let change = Note::new(spending.owner(), U256::from(250u64), asset, CHAIN_ID).unwrap();
    let recipient = Address::repeat_byte(0x77);
    let operation =
        Operation::withdraw(vec![deposited.clone()], Some(change), recipient).unwrap();
    assert_eq!(operation.public_amount, -750);

    let membership = tree.proof(1).unwrap();
    let inputs = build_inputs(
        &spending,
        &operation,
        vec![membership],
        tree.root(),
        ProofSystem::ConstantSize,
    )
    .unwrap();

    // The constant-size backend publishes the chain id explicitly.
    let signals = inputs.public.to_vec(ProofSystem::ConstantSize);
    assert_eq!(signals.len(), 9);
    assert_eq!(signals[8], B256::from(U256::from(CHAIN_ID)));
    assert_eq!(
        signals[7],
        B256::left_padding_from(recipient.as_slice())
    );

    let bundle = MockProver.prove(&inputs).await.unwrap();
    validate_bundle(
        &bundle,
        &inputs.public,
        ProofSystem::ConstantSize,
        &MockVerifier,
    )
    .await
    .unwrap();

    // After submission the chain records the nullifier; the note is dead.
    let nullifier = deposited.nullifier(&spending).0;
    assert!(!chain.is_nullifier_spent(nullifier).await.unwrap());
    chain.publish_nullifier(nullifier);
    assert!(chain.is_nullifier_spent(nullifier).await.unwrap());
}

#[tokio::test]
async fn reorg_reconciliation_prunes_phantoms() {
    let keys = recipient_keys();
    let spending = keys.spending.clone();
    let asset = asset_id(CHAIN_ID, token());

    let survivor = Note::new(spending.owner(), U256::from(100u64), asset, CHAIN_ID).unwrap();
    let orphaned = Note::new(spending.owner(), U256::from(200u64), asset, CHAIN_ID).unwrap();

    let chain = MockChain::new();
    chain.submit_deposit(survivor.commitment().0);
    chain.submit_deposit(orphaned.commitment().0);

    let mut store = NoteStore::new();
    let survivor_c = store.insert(survivor.clone(), 1);
    let orphaned_c = store.insert(orphaned, 2);
    store.mark_included(&survivor_c, 0);
    store.mark_included(&orphaned_c, 1);

    // The block carrying the second deposit is reorged away.
    chain.revert_last_events(1);

    let events = chain.deposit_events(SyncCursor::default()).await.unwrap();
    let (tree, report) = reconcile_store(&mut store, &events).unwrap();
    assert_eq!(report.phantoms, 1);
    assert_eq!(report.reindexed, 0);
    expect_root(&tree, chain.pool_root().await.unwrap()).unwrap();

    // Only the surviving note remains spendable.
    assert_eq!(store.balance(asset), U256::from(100u64));
    assert_eq!(store.get(&orphaned_c).unwrap().leaf_index, None);

    // The survivor's membership proof holds against the reconciled root.
    let proof = tree.proof(0).unwrap();
    assert!(proof.verify(survivor.commitment().0, tree.root()));

    // Running reconciliation again changes nothing.
    let (_, second) = reconcile_store(&mut store, &events).unwrap();
    assert_eq!(second.phantoms, 0);
    assert_eq!(second.reindexed, 0);
}

#[tokio::test]
async fn snapshot_survives_serialization() {
    let chain = MockChain::new();
    for byte in 1u8..=4 {
        chain.submit_deposit(B256::repeat_byte(byte));
    }
    let events = chain.deposit_events(SyncCursor::default()).await.unwrap();
    let tree = rebuild_from_events(&events).unwrap();

    let encoded = serde_json::to_string(&tree.snapshot()).unwrap();
    let restored = PoolTree::restore(&serde_json::from_str(&encoded).unwrap()).unwrap();

    assert_eq!(restored.root(), tree.root());
    assert_eq!(restored.cursor(), tree.cursor());

    // The restored mirror resumes syncing from its cursor without gaps.
    chain.submit_deposit(B256::repeat_byte(0x05));
    let fresh = chain.deposit_events(restored.cursor()).await.unwrap();
    assert_eq!(fresh.len(), 1);
    let mut resumed = restored;
    for event in &fresh {
        resumed.insert(event.commitment).unwrap();
    }
    expect_root(&resumed, chain.pool_root().await.unwrap()).unwrap();
}

#[tokio::test]
async fn transfer_between_shielded_identities() {
    let alice = recipient_keys();
    let bob = derive_keys("0xbob-challenge", "990011").unwrap();
    let asset = asset_id(CHAIN_ID, token());

    let funding =
        Note::new(alice.spending.owner(), U256::from(1_000u64), asset, CHAIN_ID).unwrap();

    let chain = MockChain::new();
    chain.submit_deposit(funding.commitment().0);
    let events = chain.deposit_events(SyncCursor::default()).await.unwrap();
    let tree = rebuild_from_events(&events).unwrap();

    // Alice pays Bob 600 and keeps 400.
    let to_bob = Note::new(bob.spending.owner(), U256::from(600u64), asset, CHAIN_ID).unwrap();
    let change =
        Note::new(alice.spending.owner(), U256::from(400u64), asset, CHAIN_ID).unwrap();
    let operation =
        Operation::transfer(vec![funding.clone()], vec![to_bob.clone(), change]).unwrap();
    assert_eq!(operation.public_amount, 0);

    let inputs = build_inputs(
        &alice.spending,
        &operation,
        vec![tree.proof(0).unwrap()],
        tree.root(),
        ProofSystem::Groth16,
    )
    .unwrap();

    // Bob, not Alice, holds the key that nullifies his new note.
    let bobs_nullifier = to_bob.nullifier(&bob.spending);
    assert_ne!(bobs_nullifier, to_bob.nullifier(&alice.spending));

    let bundle = MockProver.prove(&inputs).await.unwrap();
    validate_bundle(&bundle, &inputs.public, ProofSystem::Groth16, &MockVerifier)
        .await
        .unwrap();
}
