pub mod html_writer;

pub use html_writer::{escape_html, no_results_message, popup_html, HtmlWriter, RenderedMarker, RenderedView};
