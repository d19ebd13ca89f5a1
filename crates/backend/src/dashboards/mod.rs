pub mod admin_summary;
