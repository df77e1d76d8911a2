use crate::{
    App, AppView, LOADING_FRAMES,
    analytics::{
        AnalyticsRecord, AnalyticsView, ImagePair, ModalState, Source, ViewState,
        describe_image_ref,
    },
    stats::{SummaryStats, format_metric, truncate_title},
    submission::{SubmissionState, SubmitField},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Clear, Paragraph, Row, Table, TableState, Wrap},
};

const APP_TITLE: &str = "Automated Market Research and Trigger Finder";

const ABOUT_TEXT: &str = "The Product Sentiment Analyzer is a tool that helps you understand \
customer sentiment about your products. By analyzing reviews and feedback, it provides valuable \
insights into how your products are perceived in the market.\n\n\
How it works:\n\
- Enter your product name in the form\n\
- Our system collects and analyzes customer reviews\n\
- You receive detailed sentiment analysis reports\n\
- Identify strengths and areas for improvement\n\n\
Note: this tool uses natural language processing to provide accurate sentiment analysis. \
Results may take a few moments to generate.";

const TEAM_TEXT: &str = "Automated Market Research and Trigger Finder is built by a small team \
focused on turning community chatter into product decisions.\n\n\
For every submitted product the backend collects recent YouTube videos and Reddit posts, scores \
their sentiment, and renders a word cloud and a sentiment chart per source. This dashboard is \
the terminal front end for that pipeline.";

pub(crate) struct UiRenderer<'a> {
    app: &'a App,
}

impl<'a> UiRenderer<'a> {
    pub(crate) fn new(app: &'a App) -> Self {
        Self { app }
    }

    pub(crate) fn render(&self, frame: &mut Frame) {
        match self.app.view {
            AppView::Submit => self.render_submit(frame),
            AppView::Youtube => self.render_analytics(frame, Source::Youtube),
            AppView::Reddit => self.render_analytics(frame, Source::Reddit),
            AppView::Team => self.render_team(frame),
        }
    }

    fn render_submit(&self, frame: &mut Frame) {
        let app = self.app;
        let header_title = Line::from(APP_TITLE).bold().blue().centered();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(4),
            ])
            .split(frame.area());

        frame.render_widget(
            Paragraph::new(format!("Backend: {}", app.config.backend_url))
                .block(Block::bordered().title(header_title))
                .centered(),
            layout[0],
        );

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[1]);

        frame.render_widget(
            Paragraph::new(ABOUT_TEXT)
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(Line::from("About This Project"))),
            body[0],
        );

        frame.render_widget(
            Paragraph::new(self.submit_form_lines())
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(Line::from("Product Sentiment Analyzer"))),
            body[1],
        );

        let mut status_lines = Vec::new();
        if let Some(error) = &app.error {
            status_lines.push(format!("Error: {}", error));
        }
        status_lines
            .push("Tab or ↑/↓ to move focus. Enter activates the focused control.".to_string());
        status_lines.push("Esc or Ctrl-C to quit. Ctrl-T opens the team page.".to_string());
        if app.submit_form.actions_revealed {
            status_lines.push(
                "Analysis ready. Open YouTube or Reddit analytics below the form.".to_string(),
            );
        }

        frame.render_widget(
            Paragraph::new(status_lines.join("\n"))
                .block(Block::bordered().title(Line::from("Status"))),
            layout[2],
        );
    }

    fn submit_form_lines(&self) -> Vec<Line<'static>> {
        let form = &self.app.submit_form;
        let focus =
            |field: SubmitField| if form.field == field { "▶ " } else { "  " };

        let mut lines = Vec::new();
        lines.push(Line::from("Product Name"));
        if form.product_name.is_empty() {
            if form.field == SubmitField::ProductName && !form.is_submitting() {
                lines.push(Line::from(format!("{}[ _ ]", focus(SubmitField::ProductName))));
            } else {
                lines.push(
                    Line::from(format!(
                        "{}[ Enter product name ]",
                        focus(SubmitField::ProductName)
                    ))
                    .dim(),
                );
            }
        } else {
            let cursor = if form.field == SubmitField::ProductName && !form.is_submitting() {
                "_"
            } else {
                ""
            };
            lines.push(Line::from(format!(
                "{}[ {}{} ]",
                focus(SubmitField::ProductName),
                form.product_name,
                cursor
            )));
        }
        if let Some(error) = &form.field_error {
            lines.push(Line::from(format!("  {}", error)).red());
        }

        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "{}[ {} ]",
            focus(SubmitField::SubmitButton),
            form.submit_label()
        )));
        if form.is_submitting() {
            let frame_symbol = LOADING_FRAMES[form.spinner_frame % LOADING_FRAMES.len()];
            lines.push(Line::from(format!("  {}", frame_symbol)));
        }

        if let Some(message) = form.status_message() {
            lines.push(Line::from(""));
            let styled = match form.state {
                SubmissionState::Succeeded => Line::from(format!("  {}", message)).green(),
                _ => Line::from(format!("  {}", message)).red(),
            };
            lines.push(styled);
        }

        if form.actions_revealed {
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "{}[ YouTube Analytics ]",
                focus(SubmitField::YoutubeButton)
            )));
            lines.push(Line::from(format!(
                "{}[ Reddit Analytics ]",
                focus(SubmitField::RedditButton)
            )));
        }

        lines
    }

    fn render_analytics(&self, frame: &mut Frame, source: Source) {
        let app = self.app;
        let view = app.analytics_view(source);
        let header_title = Line::from(format!("{} Analytics", source.label()))
            .bold()
            .blue()
            .centered();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(5),
            ])
            .split(frame.area());

        let product_line = match &app.last_product {
            Some(product) => format!("Product: {}", product),
            None => "Product: <none submitted>".to_string(),
        };
        let refreshed_line = match &view.refreshed_at {
            Some(at) => format!("Last refreshed: {}", at),
            None => "Last refreshed: <never>".to_string(),
        };
        frame.render_widget(
            Paragraph::new(format!("{} • {}", product_line, refreshed_line))
                .block(Block::bordered().title(header_title))
                .centered(),
            layout[0],
        );

        match &view.state {
            ViewState::Idle | ViewState::Loading => {
                let frame_symbol = LOADING_FRAMES[view.loading_frame % LOADING_FRAMES.len()];
                frame.render_widget(
                    Paragraph::new(format!(
                        "{} Loading {} analytics…\n\nThe table, word cloud, and sentiment chart \
                         are fetched together.",
                        frame_symbol,
                        source.label()
                    ))
                    .centered()
                    .block(Block::bordered()),
                    layout[1],
                );
            }
            ViewState::Failed { reason } => {
                frame.render_widget(
                    Paragraph::new(format!(
                        "Failed to load {} analytics.\n\n{}\n\nPress r to retry.",
                        source.label(),
                        reason
                    ))
                    .red()
                    .wrap(Wrap { trim: false })
                    .centered()
                    .block(Block::bordered()),
                    layout[1],
                );
            }
            ViewState::Loaded { records, images } => {
                self.render_loaded_analytics(frame, layout[1], source, view, records, images);
            }
        }

        let mut status_lines = Vec::new();
        if let Some(error) = &app.error {
            status_lines.push(format!("Error: {}", error));
        }
        if let ViewState::Loaded { records, .. } = &view.state {
            status_lines.push(format!("{}: {}", source.record_noun(), records.len()));
        }
        if view.modal.is_open() {
            status_lines.push("Enlarged view open. Esc, Enter, or x to close.".to_string());
        } else {
            status_lines.push(
                "↑/↓ or j/k select a row. o or Enter opens the link in your browser.".to_string(),
            );
            status_lines
                .push("w/b enlarge the word cloud or sentiment chart. r refreshes.".to_string());
            status_lines.push("m or Esc back to the product form. t team. q to quit.".to_string());
        }

        frame.render_widget(
            Paragraph::new(status_lines.join("\n"))
                .block(Block::bordered().title(Line::from("Status"))),
            layout[2],
        );

        if let ModalState::Open { image } = &view.modal {
            self.render_image_modal(frame, image);
        }
    }

    fn render_loaded_analytics(
        &self,
        frame: &mut Frame,
        area: Rect,
        source: Source,
        view: &AnalyticsView,
        records: &[AnalyticsRecord],
        images: &ImagePair,
    ) {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(4),
                Constraint::Length(4),
            ])
            .split(area);

        let header = Row::new(vec![
            source.title_column().to_string(),
            "Link".to_string(),
            source.metric_noun().to_string(),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = records
            .iter()
            .map(|record| {
                let title = match source.title_display_limit() {
                    Some(limit) => truncate_title(&record.title, limit),
                    None => record.title.clone(),
                };
                Row::new(vec![title, record.url.clone(), format_metric(record.metric)])
            })
            .collect();

        let mut table_state = TableState::default();
        table_state.select(view.selected_row);

        frame.render_stateful_widget(
            Table::new(
                rows,
                [
                    Constraint::Percentage(48),
                    Constraint::Percentage(34),
                    Constraint::Percentage(18),
                ],
            )
            .header(header)
            .block(Block::bordered().title(Line::from(format!(
                "{} {}",
                source.label(),
                source.record_noun()
            ))))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ "),
            sections[0],
            &mut table_state,
        );

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(sections[1]);

        frame.render_widget(
            Paragraph::new(format!(
                "{}\nPress w to enlarge.",
                describe_image_ref(&images.word_cloud)
            ))
            .centered()
            .block(Block::bordered().title(Line::from("Word Cloud"))),
            charts[0],
        );
        frame.render_widget(
            Paragraph::new(format!(
                "{}\nPress b to enlarge.",
                describe_image_ref(&images.bar_chart)
            ))
            .centered()
            .block(Block::bordered().title(Line::from("Sentiment Analysis"))),
            charts[1],
        );

        if let Some(stats) = SummaryStats::from_records(records) {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(25),
                    Constraint::Percentage(25),
                    Constraint::Percentage(25),
                    Constraint::Percentage(25),
                ])
                .split(sections[2]);

            let entries = [
                (
                    format!("Total {}", source.record_noun()),
                    stats.count.to_string(),
                ),
                (
                    format!("Total {}", source.metric_noun()),
                    format_metric(stats.total),
                ),
                (
                    format!("Average {}", source.metric_noun()),
                    format_metric(stats.average),
                ),
                (
                    source.top_label().to_string(),
                    truncate_title(&stats.top_title, 40),
                ),
            ];
            for (index, (label, value)) in entries.into_iter().enumerate() {
                frame.render_widget(
                    Paragraph::new(value)
                        .bold()
                        .centered()
                        .block(Block::bordered().title(Line::from(label))),
                    cells[index],
                );
            }
        }
    }

    fn render_image_modal(&self, frame: &mut Frame, image: &str) {
        let area = Self::centered_rect(frame.area(), 70, 60);
        frame.render_widget(Clear, area);
        let text = format!(
            "{}\n\nReference: {}\n\nPress Esc, Enter, or x to close.",
            describe_image_ref(image),
            truncate_title(image, 120)
        );
        frame.render_widget(
            Paragraph::new(text)
                .wrap(Wrap { trim: false })
                .centered()
                .block(Block::bordered().title(Line::from("Enlarged view").bold())),
            area,
        );
    }

    fn render_team(&self, frame: &mut Frame) {
        let app = self.app;
        let header_title = Line::from("Team").bold().blue().centered();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(4),
            ])
            .split(frame.area());

        frame.render_widget(
            Paragraph::new(APP_TITLE)
                .block(Block::bordered().title(header_title))
                .centered(),
            layout[0],
        );

        frame.render_widget(
            Paragraph::new(TEAM_TEXT)
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(Line::from("Team"))),
            layout[1],
        );

        let mut status_lines = Vec::new();
        if let Some(error) = &app.error {
            status_lines.push(format!("Error: {}", error));
        }
        status_lines.push("Press m or Esc to return to the product form. q to quit.".to_string());

        frame.render_widget(
            Paragraph::new(status_lines.join("\n"))
                .block(Block::bordered().title(Line::from("Status"))),
            layout[2],
        );
    }

    fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(vertical[1]);
        horizontal[1]
    }
}
