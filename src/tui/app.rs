//! Application state and event loop

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget, DefaultTerminal, Frame};

use crate::config::Config;
use crate::services::data_loader::SourceReport;
use crate::services::{Aggregator, ContractStore, LoadResult, RecordFilter};
use crate::types::{FiscalKpis, VarianceTable};

use super::theme::Theme;
use super::widgets::{
    help::HelpPopup,
    models::{ModelsData, ModelsView},
    overview::{Overview, OverviewData},
    revenue::{RevenueData, RevenueView},
    seasonal::{SeasonalData, SeasonalView},
    tabs::Tab,
    trends::{TrendsData, TrendsView},
    variance::VarianceView,
};

/// Startup settings for the dashboard
#[derive(Debug, Clone, Default)]
pub struct DashboardOptions {
    pub top_variance_rows: usize,
    /// Inclusive date bounds applied to the Trends view
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DashboardOptions {
    pub fn from_config(config: &Config, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            top_variance_rows: config.top_variance_rows,
            from,
            to,
        }
    }
}

/// Precomputed views over the loaded store
pub struct AppData {
    store: ContractStore,
    pub kpis: FiscalKpis,
    pub sources: Vec<SourceReport>,
    pub variance: VarianceTable,
    pub models: ModelsData,
    pub revenue: RevenueData,
    pub seasonal: SeasonalData,
    fuel_options: Vec<String>,
    model_options: Vec<String>,
}

impl AppData {
    pub fn new(load: LoadResult, top_variance_rows: usize) -> Self {
        let store = load.store;
        let records = store.records();

        let kpis = Aggregator::fiscal_kpis(records);
        let variance = Aggregator::quarter_variance(records, top_variance_rows);
        let models = ModelsData::from_breakdown(Aggregator::model_fuel_breakdown(records));
        let revenue = RevenueData::new(Aggregator::revenue_by_dealer(records));
        let seasonal = SeasonalData::from_records(records);
        let fuel_options = store.fuel_types();
        let model_options = store.models();

        Self {
            store,
            kpis,
            sources: load.sources,
            variance,
            models,
            revenue,
            seasonal,
            fuel_options,
            model_options,
        }
    }
}

/// Advance a filter choice: all → first option → ... → last option → all
fn cycle_choice(current: Option<usize>, len: usize) -> Option<usize> {
    match current {
        None if len > 0 => Some(0),
        Some(i) if i + 1 < len => Some(i + 1),
        _ => None,
    }
}

/// Main application
pub struct App {
    data: AppData,
    theme: Theme,
    should_quit: bool,
    current_tab: Tab,
    /// Per-tab scroll offsets, indexed by `Tab::index`
    scroll: [usize; 6],
    show_help: bool,
    filter: RecordFilter,
    fuel_choice: Option<usize>,
    model_choice: Option<usize>,
    trends: TrendsData,
}

impl App {
    pub fn new(data: AppData, options: &DashboardOptions, theme: Theme) -> Self {
        let filter = RecordFilter {
            from: options.from,
            to: options.to,
            ..Default::default()
        };
        let mut app = Self {
            data,
            theme,
            should_quit: false,
            current_tab: Tab::default(),
            scroll: [0; 6],
            show_help: false,
            filter,
            fuel_choice: None,
            model_choice: None,
            trends: TrendsData::default(),
        };
        app.refresh_trends();
        app
    }

    /// Recompute the trend series for the current filter; newest months in view
    fn refresh_trends(&mut self) {
        self.filter.fuel_types = self
            .fuel_choice
            .and_then(|i| self.data.fuel_options.get(i).cloned())
            .into_iter()
            .collect();
        self.filter.models = self
            .model_choice
            .and_then(|i| self.data.model_options.get(i).cloned())
            .into_iter()
            .collect();

        let records = self.data.store.filter(&self.filter);
        self.trends = TrendsData::from_records(&records);
        self.scroll[Tab::Trends.index()] = TrendsView::max_scroll_offset(&self.trends);
    }

    fn max_scroll(&self, tab: Tab) -> usize {
        match tab {
            Tab::Overview => 0,
            Tab::Trends => TrendsView::max_scroll_offset(&self.trends),
            Tab::Variance => VarianceView::max_scroll_offset(&self.data.variance),
            Tab::Models => ModelsView::max_scroll_offset(&self.data.models),
            Tab::Revenue => RevenueView::max_scroll_offset(&self.data.revenue),
            Tab::Seasonal => SeasonalView::max_scroll_offset(&self.data.seasonal),
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.should_quit = true;
                    }
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        self.should_quit = true;
                    }
                    KeyCode::Tab => {
                        self.current_tab = self.current_tab.next();
                    }
                    KeyCode::BackTab => {
                        self.current_tab = self.current_tab.prev();
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.scroll_up();
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.scroll_down();
                    }
                    KeyCode::Char(c @ '1'..='6') => {
                        if let Some(tab) = Tab::from_number(c as u8 - b'0') {
                            self.current_tab = tab;
                        }
                    }
                    KeyCode::Char('?') => {
                        self.show_help = !self.show_help;
                    }
                    KeyCode::Char('f') if self.current_tab == Tab::Trends => {
                        self.fuel_choice =
                            cycle_choice(self.fuel_choice, self.data.fuel_options.len());
                        self.refresh_trends();
                    }
                    KeyCode::Char('m') if self.current_tab == Tab::Trends => {
                        self.model_choice =
                            cycle_choice(self.model_choice, self.data.model_options.len());
                        self.refresh_trends();
                    }
                    _ => {}
                }
            }
        }
    }

    fn scroll_up(&mut self) {
        let scroll = &mut self.scroll[self.current_tab.index()];
        *scroll = scroll.saturating_sub(1);
    }

    fn scroll_down(&mut self) {
        let max = self.max_scroll(self.current_tab);
        let scroll = &mut self.scroll[self.current_tab.index()];
        *scroll = (*scroll + 1).min(max);
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let scroll = self.scroll[self.current_tab.index()];
        match self.current_tab {
            Tab::Overview => {
                let data = OverviewData {
                    kpis: &self.data.kpis,
                    sources: &self.data.sources,
                };
                Overview::new(data, self.theme).render(area, buf);
            }
            Tab::Trends => {
                TrendsView::new(&self.trends, &self.filter, scroll, self.theme).render(area, buf);
            }
            Tab::Variance => {
                VarianceView::new(&self.data.variance, scroll, self.theme).render(area, buf);
            }
            Tab::Models => {
                ModelsView::new(&self.data.models, scroll, self.theme).render(area, buf);
            }
            Tab::Revenue => {
                RevenueView::new(&self.data.revenue, scroll, self.theme).render(area, buf);
            }
            Tab::Seasonal => {
                SeasonalView::new(&self.data.seasonal, scroll, self.theme).render(area, buf);
            }
        }

        if self.show_help {
            let popup_area = HelpPopup::centered_area(area);
            HelpPopup::new(self.theme).render(popup_area, buf);
        }
    }
}

/// Run the dashboard over already-loaded data.
///
/// Theme detection happens before the terminal enters raw mode.
pub fn run(load: LoadResult, options: DashboardOptions) -> anyhow::Result<()> {
    let theme = Theme::detect();
    let data = AppData::new(load, options.top_variance_rows);
    let mut app = App::new(data, &options, theme);
    tracing::info!(records = app.data.store.len(), "starting dashboard");

    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, &mut app);
    ratatui::restore();
    result
}

fn run_app(terminal: &mut DefaultTerminal, app: &mut App) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        app.handle_event(event::read()?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContractRecord, Country};
    use crossterm::event::KeyEvent;
    use rust_decimal::Decimal;

    fn make_record(
        dealer: &str,
        (year, month): (i32, u32),
        model: &str,
        fuel: &str,
        amount: i64,
    ) -> ContractRecord {
        ContractRecord {
            country: Country::France,
            dealer_id: dealer.into(),
            model_description: Some(model.into()),
            fuel_type_code: Some(fuel.into()),
            contract_start_date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            contract_end_date: None,
            contract_status: "LIVE".into(),
            active: true,
            total_capital_amount: Decimal::from(amount),
        }
    }

    fn make_data() -> AppData {
        let mut records = vec![
            make_record("A", (2024, 1), "Clio", "PE", 100),
            make_record("B", (2024, 2), "Zoe", "EL", 200),
            make_record("A", (2024, 3), "Clio", "DI", 50),
        ];
        // Enough dealers to make the revenue table scroll
        for i in 0..20 {
            records.push(make_record(&format!("X{:02}", i), (2023, 10), "Clio", "PE", 1));
        }
        let load = LoadResult {
            store: ContractStore::new(records),
            sources: Vec::new(),
            skipped: Vec::new(),
            flags: Vec::new(),
        };
        AppData::new(load, 10)
    }

    fn make_app() -> App {
        let options = DashboardOptions {
            top_variance_rows: 10,
            ..Default::default()
        };
        App::new(make_data(), &options, Theme::Dark)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    // ========== cycle_choice tests ==========

    #[test]
    fn test_cycle_choice() {
        assert_eq!(cycle_choice(None, 2), Some(0));
        assert_eq!(cycle_choice(Some(0), 2), Some(1));
        assert_eq!(cycle_choice(Some(1), 2), None);
        assert_eq!(cycle_choice(None, 0), None);
    }

    // ========== navigation tests ==========

    #[test]
    fn test_app_initial_state() {
        let app = make_app();
        assert_eq!(app.current_tab, Tab::Overview);
        assert!(!app.should_quit());
        assert!(!app.show_help);
        assert_eq!(app.data.kpis.contract_count, 23);
    }

    #[test]
    fn test_app_quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut app = make_app();
            press(&mut app, code);
            assert!(app.should_quit());
        }

        let mut app = make_app();
        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit());
    }

    #[test]
    fn test_app_tab_navigation() {
        let mut app = make_app();

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_tab, Tab::Trends);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_tab, Tab::Variance);

        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::BackTab,
            KeyModifiers::SHIFT,
        )));
        assert_eq!(app.current_tab, Tab::Trends);
    }

    #[test]
    fn test_app_number_key_navigation() {
        let mut app = make_app();
        for (key, tab) in [
            ('6', Tab::Seasonal),
            ('4', Tab::Models),
            ('5', Tab::Revenue),
            ('3', Tab::Variance),
            ('2', Tab::Trends),
            ('1', Tab::Overview),
        ] {
            press(&mut app, KeyCode::Char(key));
            assert_eq!(app.current_tab, tab);
        }

        press(&mut app, KeyCode::Char('7'));
        assert_eq!(app.current_tab, Tab::Overview);
    }

    #[test]
    fn test_app_help_toggle() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('?'));
        assert!(!app.show_help);
    }

    // ========== scroll tests ==========

    #[test]
    fn test_scroll_is_clamped_per_tab() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('5'));

        let max = RevenueView::max_scroll_offset(&app.data.revenue);
        assert!(max > 0);
        for _ in 0..max + 5 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.scroll[Tab::Revenue.index()], max);

        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.scroll[Tab::Revenue.index()], max - 1);
        // Other tabs untouched
        assert_eq!(app.scroll[Tab::Models.index()], 0);
    }

    #[test]
    fn test_scroll_up_saturates() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.scroll[Tab::Models.index()], 0);
    }

    // ========== trend filter tests ==========

    #[test]
    fn test_fuel_filter_cycles_on_trends_tab() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('2'));
        assert!(app.filter.fuel_types.is_empty());
        assert_eq!(app.trends.contract_count, 23);

        // Options in first-appearance order: PE, EL, DI
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter.fuel_types, vec!["PE".to_string()]);
        assert_eq!(app.trends.contract_count, 21);

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter.fuel_types, vec!["EL".to_string()]);
        assert_eq!(app.trends.total_revenue, Decimal::from(200));

        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('f'));
        assert!(app.filter.fuel_types.is_empty());
    }

    #[test]
    fn test_model_filter_combines_with_fuel() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('2'));

        press(&mut app, KeyCode::Char('m')); // Clio
        assert_eq!(app.trends.contract_count, 22);

        press(&mut app, KeyCode::Char('f')); // PE
        press(&mut app, KeyCode::Char('f')); // EL: no electric Clio
        assert_eq!(app.trends.contract_count, 0);
        assert!(app.trends.points.is_empty());
    }

    #[test]
    fn test_filter_keys_ignored_on_other_tabs() {
        let mut app = make_app();
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('m'));
        assert!(app.filter.fuel_types.is_empty());
        assert!(app.filter.models.is_empty());
    }

    #[test]
    fn test_date_bounds_from_options() {
        let options = DashboardOptions {
            top_variance_rows: 10,
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: NaiveDate::from_ymd_opt(2024, 2, 29),
        };
        let app = App::new(make_data(), &options, Theme::Dark);
        assert_eq!(app.trends.contract_count, 2);
        assert_eq!(app.trends.total_revenue, Decimal::from(300));
    }

    #[test]
    fn test_dashboard_options_from_config() {
        let config = Config {
            top_variance_rows: 3,
            ..Default::default()
        };
        let to = NaiveDate::from_ymd_opt(2024, 6, 30);
        let options = DashboardOptions::from_config(&config, None, to);
        assert_eq!(options.top_variance_rows, 3);
        assert_eq!(options.from, None);
        assert_eq!(options.to, to);
    }

    // ========== render tests ==========

    #[test]
    fn test_every_tab_renders() {
        let mut app = make_app();
        let area = Rect::new(0, 0, 120, 40);
        for tab in Tab::all() {
            app.current_tab = *tab;
            app.show_help = true;
            let mut buf = Buffer::empty(area);
            (&app).render(area, &mut buf);
        }
    }
}
