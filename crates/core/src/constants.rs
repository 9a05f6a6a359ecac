/// Number of days an offer stays valid after it was created.
pub const OFFER_VALIDITY_DAYS: i64 = 30;

/// Decimal places used for premiums and accounting amounts.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Chat history kept in memory for newly connected clients.
pub const CHAT_HISTORY_LIMIT: usize = 100;

/// Upper bound on a single chat message.
pub const CHAT_MESSAGE_MAX_LEN: usize = 1000;

/// Variable bound to the number of covered days in pricing formulas.
pub const FORMULA_VAR_DAYS: &str = "DAYS";

/// Variable bound to the calendar month (1-12) the cover starts in.
pub const FORMULA_VAR_POLICY_FROM_MONTH: &str = "POLICY_FROM_MONTH";
