pub mod add_reader_cmd;
pub mod change_status_cmd;
pub mod extend_card_cmd;
pub mod get_reader_cmd;
pub mod query_readers_cmd;
pub mod reader_stats_cmd;
pub mod reconcile_expired_cmd;
pub mod remove_reader_cmd;
pub mod update_reader_cmd;
pub mod update_score_cmd;
