pub mod error;
pub mod fragment;
pub mod presenter;
pub mod rest;
