pub mod scr;
