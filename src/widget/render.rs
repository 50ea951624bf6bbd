use std::fmt::Write;

use super::WidgetView;

const MOUNT_FAILURE_MESSAGE: &str = "Failed to load the application. Please refresh the page.";

const APP_PREFIX: &str = "headless-app-";
const ERROR_PREFIX: &str = "headless-error-";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// Shown in place of a widget that could not be mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    pub container_id: String,
    pub message: String,
}

impl ErrorPanel {
    pub fn new(container_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            message: message.into(),
        }
    }

    pub fn mount_failure(container_id: impl Into<String>) -> Self {
        Self::new(container_id, MOUNT_FAILURE_MESSAGE)
    }

    // The host page's error boundary that accompanies `headless-app-*`.
    pub fn boundary_id(&self) -> Option<String> {
        self.container_id
            .strip_prefix(APP_PREFIX)
            .map(|section| format!("{ERROR_PREFIX}{section}"))
    }

    pub fn render_html(&self) -> String {
        format!(
            concat!(
                "<div class=\"vue-app-error\">\n",
                "  <h3>Error</h3>\n",
                "  <p>{}</p>\n",
                "  <button onclick=\"location.reload()\">Refresh Page</button>\n",
                "</div>\n"
            ),
            escape_html(&self.message)
        )
    }
}

impl WidgetView {
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        let busy = if self.loading { " is-loading" } else { "" };

        let _ = writeln!(
            html,
            "<div class=\"vote-widget{}\" id=\"{}\">",
            busy,
            escape_html(&self.container_id)
        );
        let _ = writeln!(html, "  <h2>{}</h2>", escape_html(&self.title));

        if let Some(error) = &self.error {
            let _ = writeln!(html, "  <p class=\"vote-error\">{}</p>", escape_html(error));
        }
        if let Some(banner) = &self.banner {
            let _ = writeln!(html, "  <p class=\"vote-banner\">{}</p>", escape_html(banner));
        }

        html.push_str("  <ul class=\"vote-options\">\n");
        for button in &self.buttons {
            let _ = writeln!(
                html,
                "    <li><button data-product-id=\"{}\"{}{}>{}</button></li>",
                escape_html(button.product.id.as_str()),
                if button.enabled { "" } else { " disabled" },
                if button.voted { " class=\"voted\"" } else { "" },
                escape_html(&button.product.title)
            );
        }
        html.push_str("  </ul>\n");

        if let Some(results) = &self.results {
            html.push_str("  <ol class=\"vote-results\">\n");
            for row in results {
                let _ = writeln!(
                    html,
                    "    <li data-product-id=\"{}\">{}: {}</li>",
                    escape_html(row.product_id.as_str()),
                    escape_html(&row.title),
                    row.vote_count
                );
            }
            html.push_str("  </ol>\n");
        }

        html.push_str("</div>\n");
        html
    }
}
