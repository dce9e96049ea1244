pub mod panic_handler;
