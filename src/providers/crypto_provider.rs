use rand::Rng;

/// Length of a phone verification code
pub const VERIFICATION_CODE_LENGTH: usize = 6;

/// Random value generation for one-time codes
pub struct CryptoProvider;

impl CryptoProvider {
    pub fn new() -> Self {
        Self
    }

    /// Generate a uniformly random six-digit code, zero padded
    ///
    /// Every value in `000000..=999999` is equally likely, so leading zeros are
    /// kept rather than drawing from `100000..=999999`.
    pub fn generate_verification_code(&self) -> String {
        let mut rng = rand::rng();
        let value: u32 = rng.random_range(0..1_000_000);
        format!("{:06}", value)
    }
}

impl Default for CryptoProvider {
    fn default() -> Self {
        Self::new()
    }
}
