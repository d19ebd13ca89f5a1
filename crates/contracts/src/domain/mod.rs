pub mod budget;
pub mod division;
pub mod gross_profit;
pub mod sales;
pub mod salesperson;
