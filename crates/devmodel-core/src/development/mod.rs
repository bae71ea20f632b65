pub mod costs;
pub mod deal;
pub mod investor;
pub mod market;
pub mod sales;
pub mod senior_loan;
pub mod waterfall;
