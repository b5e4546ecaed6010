pub mod capture_worker;
