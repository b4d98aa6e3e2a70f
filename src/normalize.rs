pub mod freeze;
