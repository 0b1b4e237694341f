use crate::StyleConfig;

/// `:root` custom properties for the style config plus base rules
pub fn render_stylesheet(style: &StyleConfig) -> String {
    let mut css = String::new();

    css.push_str(":root {\n");
    for (name, value) in &style.colors {
        css.push_str(&format!("  --color-{}: {};\n", name, value));
    }
    let typography = &style.typography;
    css.push_str(&format!("  --font-family: {};\n", typography.font_family));
    css.push_str(&format!(
        "  --font-family-heading: {};\n",
        typography.heading_font_family
    ));
    css.push_str(&format!("  --font-size-base: {};\n", typography.base_size));
    css.push_str(&format!("  --line-height: {};\n", typography.line_height));
    for (name, value) in &style.spacing {
        css.push_str(&format!("  --spacing-{}: {};\n", name, value));
    }
    css.push_str("}\n\n");

    css.push_str(BASE_RULES);
    css
}

const BASE_RULES: &str = "*, *::before, *::after {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: var(--font-family);
  font-size: var(--font-size-base);
  line-height: var(--line-height);
  color: var(--color-text);
  background: var(--color-background);
}

h1, h2, h3, h4, h5, h6 {
  font-family: var(--font-family-heading);
  line-height: 1.2;
}

a {
  color: var(--color-primary);
}

img {
  max-width: 100%;
  height: auto;
}

.retouch-page {
  padding: var(--spacing-lg);
}
";
