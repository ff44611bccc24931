pub mod create_borrow_cmd;
pub mod get_borrow_cmd;
pub mod list_borrows_cmd;
pub mod mark_overdue_cmd;
pub mod reader_borrows_cmd;
pub mod reader_penalties_cmd;
pub mod record_penalty_cmd;
pub mod return_books_cmd;
pub mod update_borrow_cmd;
