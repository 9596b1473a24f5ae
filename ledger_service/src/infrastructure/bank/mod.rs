pub mod mock_bank;
