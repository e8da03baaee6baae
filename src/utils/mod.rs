mod text;

pub use text::has_meaningful_content;
