pub mod raw16;
