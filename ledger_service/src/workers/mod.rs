pub mod release_worker;
pub mod withdraw_worker;
