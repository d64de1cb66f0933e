// src/terminal.rs
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::{self, stdin, Write};
use std::path::PathBuf;
use tracing::debug;

use workout_logger_lib::{Config, Operation, Status, ViewSurface, WorkoutForm, WorkoutRow};

/// stdout/stdin rendition of the view.
pub struct TerminalSurface {
    header_color: Color,
    selected_color: Color,
    pub export_csv: bool,
    pub assume_yes: bool,
    pub download_dir: PathBuf,
    /// One-shot commands hide the table while they load what they need.
    pub show_table: bool,
    interactive: bool,
    pub selection_controls: bool,
    pub controls_enabled: bool,
    pub form: WorkoutForm,
}

impl TerminalSurface {
    pub fn new(config: &Config, export_csv: bool, interactive: bool) -> Self {
        TerminalSurface {
            header_color: config.header_color(),
            selected_color: config.selected_color(),
            export_csv,
            assume_yes: false,
            download_dir: config.download_dir(),
            show_table: true,
            interactive,
            selection_controls: false,
            controls_enabled: true,
            form: WorkoutForm::default(),
        }
    }

    pub fn print_form(&self) {
        let unset = |value: &str| if value.is_empty() { "-".to_string() } else { value.to_string() };
        println!("  name:     {}", unset(&self.form.name));
        println!("  start:    {}", unset(&self.form.start));
        println!("  duration: {}", unset(&self.form.duration));
        println!("  distance: {}", unset(&self.form.distance));
        println!("  unit:     {}", unset(&self.form.unit));
        println!("  notes:    {}", unset(&self.form.notes));
    }

    fn print_table(&self, rows: &[WorkoutRow], selected: Option<usize>) {
        let mut table = Table::new();
        let mut header = vec![Cell::new("#").fg(self.header_color)];
        header.extend(WorkoutRow::HEADERS.iter().map(|h| Cell::new(h).fg(self.header_color)));

        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header);

        for (index, row) in rows.iter().enumerate() {
            let is_selected = selected == Some(index);
            let mut cells = vec![Cell::new(index + 1)];
            cells.extend(row.cells().into_iter().map(Cell::new));
            if is_selected {
                cells = cells
                    .into_iter()
                    .map(|c| c.fg(self.selected_color).add_attribute(Attribute::Bold))
                    .collect();
            }
            table.add_row(cells);
        }
        println!("{table}");
    }

    fn print_csv(&self, rows: &[WorkoutRow]) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(io::stdout());
        writer.write_record(WorkoutRow::HEADERS)?;
        for row in rows {
            writer.write_record(row.cells())?;
        }
        writer.flush()?;
        Ok(())
    }

    fn read_answer(&self, question: &str) -> Option<String> {
        print!("{question} ");
        io::stdout().flush().ok()?;
        let mut input = String::new();
        match stdin().read_line(&mut input) {
            Ok(0) | Err(_) => None, // EOF or closed stdin
            Ok(_) => Some(input.trim().to_string()),
        }
    }
}

impl ViewSurface for TerminalSurface {
    fn render_table(&mut self, rows: &[WorkoutRow], selected: Option<usize>) {
        if !self.show_table {
            return;
        }
        if self.export_csv {
            if let Err(e) = self.print_csv(rows) {
                eprintln!("Error writing CSV: {e}");
            }
        } else if rows.is_empty() {
            println!("No workouts found.");
        } else {
            self.print_table(rows, selected);
        }
    }

    fn show_form(&mut self, form: &WorkoutForm) {
        self.form = form.clone();
        if self.interactive && !form.is_empty() {
            println!("Form:");
            self.print_form();
        }
    }

    fn show_status(&mut self, status: Status) {
        match status {
            Status::Success(text) | Status::Info(text) => println!("{text}"),
            Status::Error(text) => eprintln!("Error: {text}"),
        }
    }

    fn alert(&mut self, message: &str) {
        eprintln!("!! {message}");
    }

    fn confirm(&mut self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        self.read_answer(&format!("{question} [y/N]:"))
            .map_or(false, |answer| answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }

    fn prompt(&mut self, question: &str) -> Option<String> {
        self.read_answer(question)
    }

    fn set_selection_controls(&mut self, visible: bool) {
        self.selection_controls = visible;
        if self.interactive && visible {
            println!("Selected. 'update' or 'delete' now apply to this workout.");
        }
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
        if self.interactive && !enabled {
            println!("Data commands are disabled until a database is bound. Use 'connect'.");
        }
    }

    fn set_database_status(&mut self, status: &str) {
        println!("{status}");
    }

    fn set_pending(&mut self, op: Operation, pending: bool) {
        debug!("{} pending: {}", op, pending);
        if self.interactive && pending {
            eprintln!("{op}...");
        }
    }

    fn reset_file_input(&mut self) {
        debug!("Import file input reset");
    }

    fn save_download(&mut self, file_name: &str, contents: &[u8]) -> io::Result<()> {
        std::fs::create_dir_all(&self.download_dir)?;
        let path = self.download_dir.join(file_name);
        std::fs::write(&path, contents)?;
        println!("Saved {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }
}
