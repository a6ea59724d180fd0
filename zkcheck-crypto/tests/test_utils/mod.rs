use rand::SeedableRng;

// Seeded rng so failures reproduce across runs.
pub fn seeded_rng() -> (impl rand::CryptoRng + rand::RngCore) {
    const TEST_RNG_SEED: [u8; 32] = *b"zkcheck escrow test seed 0123456";
    rand::rngs::StdRng::from_seed(TEST_RNG_SEED)
}
