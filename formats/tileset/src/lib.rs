pub mod icn;
