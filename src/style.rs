use ratatui::style::{Color, Modifier, Style};

/// Every construct a [`Stylist`] can be asked to paint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Element {
    /// Heading of the given level, 1 through 6.
    Heading(u8),
    Paragraph,
    Text,
    Code,
    Codespan,
    Blockquote,
    BlockquoteText,
    Html,
    Hr,
    Listitem,
    Strong,
    Em,
    Del,
    Link,
    Href,
    Image,
    Table,
    DoneMark,
    UndoneMark,
}

/// Applies terminal styling to rendered text. The layout code only ever
/// talks to this trait, so any colour backend can be swapped in.
pub trait Stylist {
    fn paint(&self, element: Element, text: &str) -> String;
}

impl<F> Stylist for F
where
    F: Fn(Element, &str) -> String,
{
    fn paint(&self, element: Element, text: &str) -> String {
        self(element, text)
    }
}

/// A [`Stylist`] backed by one `ratatui` style per construct.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub paragraph: Style,
    pub text: Style,
    pub code: Style,
    pub codespan: Style,
    pub blockquote: Style,
    pub blockquote_text: Style,
    pub html: Style,
    pub hr: Style,
    pub listitem: Style,
    pub strong: Style,
    pub em: Style,
    pub del: Style,
    pub link: Style,
    pub href: Style,
    pub image: Style,
    pub table: Style,
    pub done_mark: Style,
    pub undone_mark: Style,
    pub headers: [Style; 6],
}

impl Default for Theme {
    fn default() -> Self {
        let bold = Modifier::BOLD;
        let underlined = Modifier::UNDERLINED;
        Self {
            paragraph: Style::default(),
            text: Style::default(),
            code: Style::default().fg(Color::Yellow),
            codespan: Style::default().fg(Color::Yellow),
            blockquote: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            blockquote_text: Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            html: Style::default().fg(Color::DarkGray),
            hr: Style::default().add_modifier(Modifier::DIM),
            listitem: Style::default().fg(Color::Magenta),
            strong: Style::default().add_modifier(bold),
            em: Style::default().add_modifier(Modifier::ITALIC),
            del: Style::default().add_modifier(Modifier::DIM | Modifier::CROSSED_OUT),
            link: Style::default().fg(Color::Blue),
            href: Style::default().fg(Color::Blue).add_modifier(underlined),
            image: Style::default().fg(Color::Cyan),
            table: Style::default(),
            done_mark: Style::default().fg(Color::Green).add_modifier(bold),
            undone_mark: Style::default().fg(Color::Red).add_modifier(bold),
            headers: [
                Style::default().fg(Color::Red).add_modifier(underlined | bold),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(underlined | bold),
                Style::default().fg(Color::Yellow).add_modifier(underlined),
                Style::default().fg(Color::Green).add_modifier(underlined),
                Style::default().fg(Color::Green),
                Style::default().fg(Color::Green).add_modifier(Modifier::DIM),
            ],
        }
    }
}

impl Theme {
    /// Paints nothing: every construct renders as its bare text.
    pub fn plain() -> Self {
        Self {
            paragraph: Style::default(),
            text: Style::default(),
            code: Style::default(),
            codespan: Style::default(),
            blockquote: Style::default(),
            blockquote_text: Style::default(),
            html: Style::default(),
            hr: Style::default(),
            listitem: Style::default(),
            strong: Style::default(),
            em: Style::default(),
            del: Style::default(),
            link: Style::default(),
            href: Style::default(),
            image: Style::default(),
            table: Style::default(),
            done_mark: Style::default(),
            undone_mark: Style::default(),
            headers: [Style::default(); 6],
        }
    }

    pub fn style_for(&self, element: Element) -> Style {
        match element {
            Element::Heading(level) => {
                let idx = usize::from(level.clamp(1, 6)) - 1;
                self.headers[idx]
            }
            Element::Paragraph => self.paragraph,
            Element::Text => self.text,
            Element::Code => self.code,
            Element::Codespan => self.codespan,
            Element::Blockquote => self.blockquote,
            Element::BlockquoteText => self.blockquote_text,
            Element::Html => self.html,
            Element::Hr => self.hr,
            Element::Listitem => self.listitem,
            Element::Strong => self.strong,
            Element::Em => self.em,
            Element::Del => self.del,
            Element::Link => self.link,
            Element::Href => self.href,
            Element::Image => self.image,
            Element::Table => self.table,
            Element::DoneMark => self.done_mark,
            Element::UndoneMark => self.undone_mark,
        }
    }
}

impl Stylist for Theme {
    fn paint(&self, element: Element, text: &str) -> String {
        paint(self.style_for(element), text)
    }
}

/// Wraps `text` in the SGR codes that switch `style` on and back off.
pub fn paint(style: Style, text: &str) -> String {
    let open = style_prefix(style);
    if open.is_empty() || text.is_empty() {
        return text.to_string();
    }
    format!("{open}{text}{}", style_suffix(style))
}

fn style_prefix(style: Style) -> String {
    let mut codes: Vec<String> = Vec::new();
    if let Some(fg) = style.fg {
        codes.push(color_code(fg, true));
    }
    if let Some(bg) = style.bg {
        codes.push(color_code(bg, false));
    }
    let modifiers = style.add_modifier;
    if modifiers.contains(Modifier::BOLD) {
        codes.push("1".into());
    }
    if modifiers.contains(Modifier::DIM) {
        codes.push("2".into());
    }
    if modifiers.contains(Modifier::ITALIC) {
        codes.push("3".into());
    }
    if modifiers.contains(Modifier::UNDERLINED) {
        codes.push("4".into());
    }
    if modifiers.contains(Modifier::REVERSED) {
        codes.push("7".into());
    }
    if modifiers.contains(Modifier::CROSSED_OUT) {
        codes.push("9".into());
    }
    sgr(&codes)
}

/// Closes only what [`style_prefix`] opened so an enclosing style survives.
fn style_suffix(style: Style) -> String {
    let mut codes: Vec<String> = Vec::new();
    if style.fg.is_some() {
        codes.push("39".into());
    }
    if style.bg.is_some() {
        codes.push("49".into());
    }
    let modifiers = style.add_modifier;
    if modifiers.intersects(Modifier::BOLD | Modifier::DIM) {
        codes.push("22".into());
    }
    if modifiers.contains(Modifier::ITALIC) {
        codes.push("23".into());
    }
    if modifiers.contains(Modifier::UNDERLINED) {
        codes.push("24".into());
    }
    if modifiers.contains(Modifier::REVERSED) {
        codes.push("27".into());
    }
    if modifiers.contains(Modifier::CROSSED_OUT) {
        codes.push("29".into());
    }
    sgr(&codes)
}

fn sgr(codes: &[String]) -> String {
    if codes.is_empty() {
        String::new()
    } else {
        format!("\x1b[{}m", codes.join(";"))
    }
}

fn color_code(color: Color, is_fg: bool) -> String {
    match color {
        Color::Reset => (if is_fg { "39" } else { "49" }).into(),
        Color::Black => ansi_basic(30, 40, is_fg),
        Color::Red => ansi_basic(31, 41, is_fg),
        Color::Green => ansi_basic(32, 42, is_fg),
        Color::Yellow => ansi_basic(33, 43, is_fg),
        Color::Blue => ansi_basic(34, 44, is_fg),
        Color::Magenta => ansi_basic(35, 45, is_fg),
        Color::Cyan => ansi_basic(36, 46, is_fg),
        Color::Gray => ansi_basic(37, 47, is_fg),
        Color::DarkGray => ansi_basic(90, 100, is_fg),
        Color::LightRed => ansi_basic(91, 101, is_fg),
        Color::LightGreen => ansi_basic(92, 102, is_fg),
        Color::LightYellow => ansi_basic(93, 103, is_fg),
        Color::LightBlue => ansi_basic(94, 104, is_fg),
        Color::LightMagenta => ansi_basic(95, 105, is_fg),
        Color::LightCyan => ansi_basic(96, 106, is_fg),
        Color::White => ansi_basic(97, 107, is_fg),
        Color::Indexed(idx) => {
            let base = if is_fg { 38 } else { 48 };
            format!("{};5;{}", base, idx)
        }
        Color::Rgb(r, g, b) => {
            let base = if is_fg { 38 } else { 48 };
            format!("{};2;{};{};{}", base, r, g, b)
        }
    }
}

fn ansi_basic(fg: u8, bg: u8, is_fg: bool) -> String {
    if is_fg {
        fg.to_string()
    } else {
        bg.to_string()
    }
}
