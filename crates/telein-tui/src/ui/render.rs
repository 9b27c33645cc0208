use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use telein_core::auth::Field;
use telein_core::promo::YOUTUBE_CHANNEL_ID;
use telein_core::PRODUCTS;

use crate::app::{App, AppState, LoginFocus};
use crate::utils::{fit_field, truncate_string};

use super::styles;

/// Width of the text inside each input box.
const FIELD_WIDTH: usize = 24;

const FORGOT_PASSWORD_URL: &str = "https://interface.telein.com.br/passlost/esquecisenha.php";
const CONTACT_URL: &str = "https://interface.telein.com.br/integra/ligueme/ligue.php?interface=bdb0d1b9e0";
const PRIVACY_URL: &str = "https://site.telein.com.br/politica-de-privacidade/";
const SITE_URL: &str = "https://ipbxinteligente.com.br/";
const INSTAGRAM_URL: &str = "https://instagram.com/telein_telecom";

const LOGO: [&str; 3] = [
    "   ╔╦╗╔═╗╦  ╔═╗╦╔╗╔",
    "    ║ ║╣ ║  ║╣ ║║║║",
    "    ╩ ╚═╝╩═╝╚═╝╩╝╚╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(16),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_login_form(frame, app, columns[0]);
    render_marketing_panel(frame, app, columns[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::Redirecting) {
        render_redirect_overlay(frame, app);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  Telein - Acesso ao Sistema";
    let help_hint = "[F1] Ajuda";
    let title_len = title.chars().count();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title_len as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

/// One labelled input line: `label: [value▌]`
fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { " " };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<16}[", label), styles::muted_style()),
        Span::styled(format!("{}{}", value, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn error_line(message: Option<&'static str>) -> Option<Line<'static>> {
    message.map(|m| {
        Line::from(Span::styled(
            format!("                  {}", m),
            styles::error_style(),
        ))
    })
}

fn render_login_form(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|l| Line::from(Span::styled(*l, styles::title_style())))
        .collect();
    lines.push(Line::from(""));

    // Identifier
    let label = app.controller.identifier_mode().label();
    lines.push(field_line(
        label,
        fit_field(&app.login_identifier, FIELD_WIDTH),
        app.login_focus == LoginFocus::Identifier,
    ));
    lines.extend(error_line(app.field_error(Field::Identifier)));

    // Password, masked unless toggled with F2
    let password = password_text(&app.login_password, app.show_password);
    lines.push(field_line(
        "Senha",
        fit_field(&password, FIELD_WIDTH),
        app.login_focus == LoginFocus::Password,
    ));
    let toggle_hint = if app.show_password { "Ocultar senha" } else { "Mostrar senha" };
    lines.push(Line::from(vec![
        Span::raw("                  "),
        Span::styled("[F2] ", styles::help_key_style()),
        Span::styled(toggle_hint, styles::muted_style()),
    ]));
    lines.extend(error_line(app.field_error(Field::Secret)));

    // Remember me
    let remember_style = if app.login_focus == LoginFocus::Remember {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let check = if app.remember { "[x]" } else { "[ ]" };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{} Lembrar", check), remember_style),
    ]));

    // Verification token
    if let Some(field) = app.verification.as_ref().filter(|_| app.show_verification()) {
        lines.push(field_line(
            "Verificação",
            fit_field(&field.value(), FIELD_WIDTH),
            app.login_focus == LoginFocus::Verification,
        ));
    }

    // Submit button, disabled while an attempt is in flight
    lines.push(Line::from(""));
    let button_focused = app.login_focus == LoginFocus::Button;
    let (label, style) = if app.is_submitting() {
        ("  Entrando...  ", styles::muted_style())
    } else if button_focused {
        ("  ▶ Entrar ◀   ", styles::selected_style())
    } else {
        ("    Entrar     ", styles::list_item_style())
    };
    lines.push(Line::from(vec![
        Span::raw("          ["),
        Span::styled(label, style),
        Span::raw("]"),
    ]));

    // Links
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Esqueci minha senha: ", styles::muted_style()),
        Span::styled(FORGOT_PASSWORD_URL, styles::link_style()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  Precisa de ajuda? Fale Conosco: ", styles::muted_style()),
        Span::styled(CONTACT_URL, styles::link_style()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  Política de Privacidade: ", styles::muted_style()),
        Span::styled(PRIVACY_URL, styles::link_style()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  Nosso Site: ", styles::muted_style()),
        Span::styled(SITE_URL, styles::link_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(Span::styled(" Login ", styles::title_style()));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_marketing_panel(frame: &mut Frame, app: &App, area: Rect) {
    let inner_width = area.width.saturating_sub(4) as usize;
    let mut lines = vec![Line::from(Span::styled(
        " Nosso Ecossistema",
        styles::highlight_style(),
    ))];

    for product in PRODUCTS.iter() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<18}", product.name), styles::list_item_style()),
            Span::styled(product.description, styles::muted_style()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Destaques", styles::highlight_style())));
    if app.promo_loading {
        lines.push(Line::from(Span::styled("  Carregando...", styles::muted_style())));
    } else if app.promo.highlights.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Confira as novidades no nosso site",
            styles::muted_style(),
        )));
    } else {
        for highlight in &app.promo.highlights {
            let target = highlight.link.as_deref().unwrap_or(&highlight.url);
            let alt = if highlight.alt.is_empty() { "Destaque" } else { highlight.alt.as_str() };
            lines.push(Line::from(vec![
                Span::styled(format!("  ▸ {} ", alt), styles::list_item_style()),
                Span::styled(
                    truncate_string(target, inner_width.saturating_sub(alt.chars().count() + 5)),
                    styles::link_style(),
                ),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Vídeo Mais Recente",
        styles::highlight_style(),
    )));
    lines.push(Line::from(Span::styled(
        format!("  {}", truncate_string(&app.promo.video.watch_url(), inner_width)),
        styles::link_style(),
    )));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Siga-nos", styles::highlight_style())));
    let channel_url = format!("https://www.youtube.com/channel/{}", YOUTUBE_CHANNEL_ID);
    for (name, url) in [("YouTube", channel_url.as_str()), ("Instagram", INSTAGRAM_URL)] {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<10}", name), styles::list_item_style()),
            Span::styled(
                truncate_string(url, inner_width.saturating_sub(12)),
                styles::link_style(),
            ),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.toast {
        Some(ref toast) => {
            let n = &toast.notification;
            Line::from(vec![
                Span::styled(format!(" {}", n.title), styles::notification_style(n.kind)),
                Span::styled(format!("  {}", n.description), styles::help_desc_style()),
            ])
        }
        None => Line::from(Span::styled(
            " Tab/↑/↓ campos   Espaço lembrar   F2 senha   Enter confirmar   Esc sair",
            styles::muted_style(),
        )),
    };
    let paragraph = Paragraph::new(line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 17, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text: Vec<Line> = LOGO
        .iter()
        .map(|l| Line::from(Span::styled(format!("          {}", l), styles::title_style())))
        .collect();
    help_text.push(Line::from(Span::styled(
        format!("                 versão {}", version),
        styles::muted_style(),
    )));
    help_text.push(Line::from(""));

    for (key, desc) in [
        ("  Tab / ↓   ", "Próximo campo"),
        ("  ⇧Tab / ↑  ", "Campo anterior"),
        ("  Espaço    ", "Marcar/desmarcar Lembrar"),
        ("  F2        ", "Mostrar/ocultar senha"),
        ("  Enter     ", "Avançar / Entrar"),
        ("  Esc       ", "Sair"),
    ] {
        help_text.push(Line::from(vec![
            Span::styled(key, styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ]));
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(vec![
        Span::styled("       Pressione ", styles::muted_style()),
        Span::styled("F1", styles::help_key_style()),
        Span::styled(" ou ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" para fechar", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_redirect_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(60, 7, frame.area());

    frame.render_widget(Clear, area);

    let target = app
        .redirect_target
        .as_ref()
        .map(|u| u.to_string())
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Redirecionando para:", styles::highlight_style())),
        Line::from(Span::styled(
            format!("  {}", truncate_string(&target, 54)),
            styles::link_style(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Password as drawn in the form: asterisks unless the user chose to show it.
fn password_text(password: &str, shown: bool) -> String {
    if shown {
        password.to_string()
    } else {
        "*".repeat(password.chars().count())
    }
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_text_masks_unless_shown() {
        assert_eq!(password_text("señha1", false), "******");
        assert_eq!(password_text("señha1", true), "señha1");
        assert_eq!(password_text("", false), "");
    }

    #[test]
    fn test_centered_rect_fits_small_area() {
        let area = centered_rect_fixed(60, 7, Rect::new(0, 0, 40, 5));
        assert_eq!(area, Rect::new(0, 0, 40, 5));
    }
}
