//! End-to-end scenarios across the registry, vaults and wallet ledger.
//!
//! Each test drives a full lifecycle (fund, create, claim, delete) and
//! checks that value is neither created nor destroyed along the way.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use lifafa_registry::{EnvelopeRegistry, XorShiftRng};
use lifafa_types::constants::{CLAIM_MODE_EQUAL, CLAIM_MODE_NONE, CLAIM_MODE_RANDOM};
use lifafa_types::*;
use lifafa_vault::Ledger;

const FUNDS: u64 = 50_000_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Helper: one registry, one funded owner, a fixed clock.
struct Harness {
    registry: EnvelopeRegistry,
    owner: Identity,
    now: DateTime<Utc>,
}

impl Harness {
    fn new(config: RegistryConfig) -> Self {
        init_tracing();
        let ledger = Arc::new(Ledger::new());
        let owner = Identity::random();
        ledger.fund(owner, Asset::Native, FUNDS).unwrap();
        let registry = EnvelopeRegistry::new(config, ledger)
            .unwrap()
            .with_rng(XorShiftRng::from_slot(271_828));
        Self {
            registry,
            owner,
            now: Utc::now(),
        }
    }

    fn ledger(&self) -> &Ledger {
        self.registry.ledger()
    }

    fn create(&self, request: CreateEnvelope) -> Result<EnvelopeAddress> {
        self.registry.create(self.owner, request, self.now)
    }

    fn claim(&self, id: u64, claimant: Identity) -> Result<ClaimReceipt> {
        self.registry.claim(EnvelopeId(id), claimant, self.now)
    }

    fn assert_conserved(&self, asset: Asset) {
        self.registry.verify_conservation(asset).unwrap();
    }
}

// ---------------------------------------------------------------------------
// Canonical scenarios
// ---------------------------------------------------------------------------

#[test]
fn equal_split_two_ways_then_ceiling() {
    let h = Harness::new(RegistryConfig::rent_free());
    h.create(CreateEnvelope::new(7, 100, 2, CLAIM_MODE_EQUAL))
        .unwrap();

    let (a, b, c) = (Identity::random(), Identity::random(), Identity::random());
    assert_eq!(h.claim(7, a).unwrap().payout, 50);
    assert_eq!(h.claim(7, b).unwrap().payout, 50);

    let err = h.claim(7, c).unwrap_err();
    assert_eq!(
        err,
        LifafaError::MaxClaimsReached {
            id: EnvelopeId(7),
            max_claims: 2
        }
    );

    let env = h.registry.fetch(EnvelopeId(7)).unwrap();
    assert_eq!(env.claims, 2);
    assert_eq!(env.remaining, 0);
    assert_eq!(h.ledger().balance(c, Asset::Native), 0);
    h.assert_conserved(Asset::Native);
}

#[test]
fn random_split_second_claim_drains() {
    let h = Harness::new(RegistryConfig::rent_free());
    h.create(CreateEnvelope::new(9, 100, 2, CLAIM_MODE_RANDOM))
        .unwrap();

    let first = h.claim(9, Identity::random()).unwrap();
    assert!((1..=99).contains(&first.payout));
    assert_eq!(first.remaining, 100 - first.payout);

    let second = h.claim(9, Identity::random()).unwrap();
    assert_eq!(second.payout, first.remaining);
    assert_eq!(second.remaining, 0);
    assert_eq!(first.payout + second.payout, 100);
    h.assert_conserved(Asset::Native);
}

#[test]
fn none_mode_persists_nothing_then_equal_succeeds() {
    let h = Harness::new(RegistryConfig::default());

    let err = h
        .create(CreateEnvelope::new(3, 100, 2, CLAIM_MODE_NONE))
        .unwrap_err();
    assert_eq!(err, LifafaError::InvalidClaimMode(0));
    assert!(h.registry.fetch(EnvelopeId(3)).is_none());
    assert_eq!(h.ledger().balance(h.owner, Asset::Native), FUNDS);

    h.create(CreateEnvelope::new(3, 100, 2, CLAIM_MODE_EQUAL))
        .unwrap();
    assert_eq!(h.registry.len(), 1);
    h.assert_conserved(Asset::Native);
}

// ---------------------------------------------------------------------------
// Ownership and reuse
// ---------------------------------------------------------------------------

#[test]
fn only_owner_deletes_and_id_is_reusable() {
    let config = RegistryConfig::default();
    let rent = config.record_rent;
    let h = Harness::new(config);
    let claimant = Identity::random();

    h.create(
        CreateEnvelope::new(11, 1_000, 3, CLAIM_MODE_RANDOM).with_names("ritu", "diwali"),
    )
    .unwrap();
    let paid = h.claim(11, claimant).unwrap().payout;

    let err = h.registry.delete(EnvelopeId(11), claimant).unwrap_err();
    assert!(matches!(err, LifafaError::Unauthorized { .. }));

    let reclaim = h.registry.delete(EnvelopeId(11), h.owner).unwrap();
    assert_eq!(reclaim.returned, 1_000 - paid);
    assert_eq!(reclaim.rent_refunded, rent);
    assert_eq!(h.ledger().balance(h.owner, Asset::Native), FUNDS - paid);
    assert!(h.registry.is_empty());
    h.assert_conserved(Asset::Native);

    // Same id, fresh record: earlier claimants may claim again.
    h.create(CreateEnvelope::new(11, 10, 1, CLAIM_MODE_EQUAL))
        .unwrap();
    let env = h.registry.fetch(EnvelopeId(11)).unwrap();
    assert_eq!(env.claims, 0);
    assert!(env.claimants.is_empty());
    assert_eq!(h.claim(11, claimant).unwrap().payout, 10);
}

#[test]
fn delete_ignores_claims_and_expiry() {
    let h = Harness::new(RegistryConfig::rent_free());
    h.create(CreateEnvelope::new(1, 30, 3, CLAIM_MODE_EQUAL).with_time_limit(5))
        .unwrap();
    for _ in 0..3 {
        h.claim(1, Identity::random()).unwrap();
    }

    // Full and long expired.
    let reclaim = h.registry.delete(EnvelopeId(1), h.owner).unwrap();
    assert_eq!(reclaim.returned, 0);
    assert_eq!(reclaim.rent_refunded, 0);
    h.assert_conserved(Asset::Native);
}

#[test]
fn equal_remainder_returns_to_owner() {
    let h = Harness::new(RegistryConfig::rent_free());
    h.create(CreateEnvelope::new(4, 100, 3, CLAIM_MODE_EQUAL))
        .unwrap();
    for _ in 0..3 {
        assert_eq!(h.claim(4, Identity::random()).unwrap().payout, 33);
    }
    assert_eq!(h.registry.fetch_balance(EnvelopeId(4)).unwrap(), 1);

    let reclaim = h.registry.delete(EnvelopeId(4), h.owner).unwrap();
    assert_eq!(reclaim.returned, 1);
    assert_eq!(h.ledger().balance(h.owner, Asset::Native), FUNDS - 99);
}

#[test]
fn equal_share_below_one_unit_pays_zero() {
    let h = Harness::new(RegistryConfig::rent_free());
    h.create(CreateEnvelope::new(12, 1, 2, CLAIM_MODE_EQUAL))
        .unwrap();

    for _ in 0..2 {
        let receipt = h.claim(12, Identity::random()).unwrap();
        assert_eq!(receipt.payout, 0);
        assert_eq!(receipt.remaining, 1);
    }
    let err = h.claim(12, Identity::random()).unwrap_err();
    assert!(matches!(err, LifafaError::MaxClaimsReached { .. }));

    let reclaim = h.registry.delete(EnvelopeId(12), h.owner).unwrap();
    assert_eq!(reclaim.returned, 1);
    assert_eq!(h.ledger().balance(h.owner, Asset::Native), FUNDS);
    h.assert_conserved(Asset::Native);
}

#[test]
fn random_shares_differ_and_leave_funds_for_open_claims() {
    let h = Harness::new(RegistryConfig::rent_free());
    h.create(CreateEnvelope::new(13, 10_000, 8, CLAIM_MODE_RANDOM))
        .unwrap();

    let payouts: Vec<u64> = (0..5)
        .map(|_| h.claim(13, Identity::random()).unwrap().payout)
        .collect();
    assert!(payouts.iter().all(|p| *p > 0));
    assert!(
        payouts.windows(2).any(|pair| pair[0] != pair[1]),
        "every share was {}",
        payouts[0]
    );

    let paid: u64 = payouts.iter().sum();
    assert!(paid < 10_000);
    let env = h.registry.fetch(EnvelopeId(13)).unwrap();
    assert_eq!(env.remaining, 10_000 - paid);
    // One unit at least for each of the three open claims.
    assert!(env.remaining >= 3);
}

// ---------------------------------------------------------------------------
// Token envelopes
// ---------------------------------------------------------------------------

#[test]
fn token_envelope_lifecycle_refunds_rent() {
    let config = RegistryConfig::default();
    let rent = config.rent_for(&Asset::Token(MintId([0; 32])));
    let h = Harness::new(config);
    let token = Asset::Token(MintId::random());
    h.ledger().fund(h.owner, token, 9_000).unwrap();

    h.create(CreateEnvelope::new(21, 9_000, 3, CLAIM_MODE_EQUAL).with_asset(token))
        .unwrap();
    assert_eq!(h.ledger().balance(h.owner, Asset::Native), FUNDS - rent);
    assert_eq!(h.ledger().balance(h.owner, token), 0);
    assert_eq!(h.registry.fetch_balance(EnvelopeId(21)).unwrap(), 9_000);
    assert_eq!(h.registry.escrowed(Asset::Native), u128::from(rent));

    let claimant = Identity::random();
    let receipt = h.claim(21, claimant).unwrap();
    assert_eq!(receipt.payout, 3_000);
    assert_eq!(h.ledger().balance(claimant, token), 3_000);
    assert_eq!(h.ledger().balance(claimant, Asset::Native), 0);
    h.assert_conserved(token);
    h.assert_conserved(Asset::Native);

    let reclaim = h.registry.delete(EnvelopeId(21), h.owner).unwrap();
    assert_eq!(reclaim.asset, token);
    assert_eq!(reclaim.returned, 6_000);
    assert_eq!(reclaim.rent_refunded, rent);
    assert_eq!(h.ledger().balance(h.owner, Asset::Native), FUNDS);
    assert_eq!(h.ledger().balance(h.owner, token), 6_000);
    assert_eq!(h.registry.escrowed(token), 0);
    h.assert_conserved(token);
    h.assert_conserved(Asset::Native);
}

#[test]
fn token_envelope_without_tokens_refunds_rent() {
    let h = Harness::new(RegistryConfig::default());
    let token = Asset::Token(MintId::random());

    let err = h
        .create(CreateEnvelope::new(22, 100, 1, CLAIM_MODE_EQUAL).with_asset(token))
        .unwrap_err();
    assert!(matches!(err, LifafaError::InsufficientFunds { .. }));
    assert_eq!(h.ledger().balance(h.owner, Asset::Native), FUNDS);
    assert!(h.registry.is_empty());
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

#[test]
fn enforced_expiry_boundary() {
    let h = Harness::new(RegistryConfig::rent_free());
    h.create(CreateEnvelope::new(5, 10, 2, CLAIM_MODE_EQUAL).with_time_limit(3_600))
        .unwrap();
    let deadline = h.now + TimeDelta::seconds(3_600);

    let just_before = h
        .registry
        .claim(EnvelopeId(5), Identity::random(), deadline - TimeDelta::seconds(1));
    assert!(just_before.is_ok());

    let err = h
        .registry
        .claim(EnvelopeId(5), Identity::random(), deadline)
        .unwrap_err();
    assert_eq!(
        err,
        LifafaError::Expired {
            id: EnvelopeId(5),
            expired_at: deadline
        }
    );
}

#[test]
fn informational_expiry_never_blocks() {
    let config = RegistryConfig::from_json(r#"{"expiry": "informational", "record_rent": 0}"#)
        .unwrap();
    let h = Harness::new(config);
    h.create(CreateEnvelope::new(5, 10, 2, CLAIM_MODE_EQUAL).with_time_limit(60))
        .unwrap();
    let much_later = h.now + TimeDelta::days(365);
    assert!(
        h.registry
            .claim(EnvelopeId(5), Identity::random(), much_later)
            .is_ok()
    );
}

#[test]
fn check_order_already_claimed_before_ceiling() {
    let h = Harness::new(RegistryConfig::rent_free());
    h.create(CreateEnvelope::new(6, 10, 1, CLAIM_MODE_EQUAL).with_time_limit(1))
        .unwrap();
    let alice = Identity::random();
    h.claim(6, alice).unwrap();

    let late = h.now + TimeDelta::seconds(10);
    let err = h.registry.claim(EnvelopeId(6), alice, late).unwrap_err();
    assert!(matches!(err, LifafaError::AlreadyClaimed { .. }));
    let err = h
        .registry
        .claim(EnvelopeId(6), Identity::random(), late)
        .unwrap_err();
    assert!(matches!(err, LifafaError::MaxClaimsReached { .. }));
}

// ---------------------------------------------------------------------------
// Conservation across many envelopes
// ---------------------------------------------------------------------------

#[test]
fn many_random_envelopes_conserve_supply() {
    let h = Harness::new(RegistryConfig::default());
    for id in 0..20u64 {
        let max_claims = id % 7 + 1;
        h.create(CreateEnvelope::new(id, 10_000 + id, max_claims, CLAIM_MODE_RANDOM))
            .unwrap();
    }

    for id in 0..20u64 {
        let mut paid = 0u64;
        loop {
            match h.claim(id, Identity::random()) {
                Ok(receipt) => {
                    assert!(receipt.payout > 0);
                    paid += receipt.payout;
                }
                Err(LifafaError::MaxClaimsReached { .. }) => break,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(paid, 10_000 + id);
        h.assert_conserved(Asset::Native);
    }

    for id in 0..20u64 {
        h.registry.delete(EnvelopeId(id), h.owner).unwrap();
    }
    assert!(h.registry.is_empty());
    assert_eq!(h.registry.escrowed(Asset::Native), 0);
    h.assert_conserved(Asset::Native);
}

#[test]
fn envelope_snapshot_serializes() {
    let h = Harness::new(RegistryConfig::rent_free());
    h.create(CreateEnvelope::new(8, 100, 2, CLAIM_MODE_RANDOM).with_names("ana", "eid"))
        .unwrap();
    h.claim(8, Identity::random()).unwrap();

    let env = h.registry.fetch(EnvelopeId(8)).unwrap();
    let json = serde_json::to_string(&env).unwrap();
    let back: Envelope = serde_json::from_str(&json).unwrap();
    assert_eq!(env, back);
    assert_eq!(back.owner_name, "ana");
}
