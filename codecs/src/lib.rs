pub mod lcw;
