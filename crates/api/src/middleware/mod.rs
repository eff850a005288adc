pub mod seller;
