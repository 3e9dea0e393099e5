//! System-wide constants: setting keys and documented policy defaults.
//!
//! The settings store is externally mutable; every key listed here has a
//! hardcoded default that takes over when the key is absent or unparseable.

/// Setting key: minimum amount a buyer may offer.
pub const SETTING_MIN_OFFER_AMOUNT: &str = "min_offer_amount";

/// Setting key: maximum simultaneous pending offers per buyer.
pub const SETTING_MAX_OFFERS_PER_USER: &str = "max_offers_per_user";

/// Setting key: maximum simultaneous pending offers per listing.
pub const SETTING_MAX_OFFERS_PER_LISTING: &str = "max_offers_per_listing";

/// Setting key: days until a new offer expires.
pub const SETTING_OFFER_EXPIRATION_DAYS: &str = "offer_expiration_days";

/// Setting key: minimum settled amount for a transaction.
pub const SETTING_MIN_TRANSACTION_AMOUNT: &str = "min_transaction_amount";

/// Setting key: minimum amount a seller can be paid out.
pub const SETTING_SELLER_PAYOUT_MINIMUM: &str = "seller_payout_minimum";

/// Setting key: flat platform fee added on top of the offer amount.
pub const SETTING_PLATFORM_FEE_FIXED: &str = "platform_fee_fixed";

/// Setting key: payment-processor percentage fee (in percent, e.g. `2.49`).
pub const SETTING_PAYPAL_FEE_PERCENTAGE: &str = "paypal_fee_percentage";

/// Setting key: payment-processor fixed fee.
pub const SETTING_PAYPAL_FEE_FIXED: &str = "paypal_fee_fixed";

/// Default maximum pending offers per buyer.
pub const DEFAULT_MAX_OFFERS_PER_USER: usize = 20;

/// Default maximum pending offers per listing.
pub const DEFAULT_MAX_OFFERS_PER_LISTING: usize = 10;

/// Default offer lifetime in days.
pub const DEFAULT_OFFER_EXPIRATION_DAYS: i64 = 7;

/// Monetary precision at every persistence boundary (2 decimal places).
pub const MONEY_SCALE: u32 = 2;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenDeal";
