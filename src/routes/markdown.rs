use pulldown_cmark::{html, Options, Parser};

/// Render a project or post body as CommonMark.
///
/// The output is passed through `ammonia`, so raw HTML in a body cannot
/// inject scripts or event handlers into the page.
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES);
    let mut rendered = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut rendered, parser);
    ammonia::clean(&rendered)
}
