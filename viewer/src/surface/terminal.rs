use std::collections::HashMap;
use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use msgs::Coord;
use tracing::{info, warn};

use crate::connection_status::ConnectionStatus;
use crate::glyphs::{cell_glyph, WallSides};
use crate::grid::CellTags;
use crate::surface::{CellHandle, RenderSurface};

const INFO_ROW: u16 = 0;
const GRID_TOP: u16 = 1;
const CELL_COLUMNS: u16 = 2;
const PANEL_GAP: u16 = 2;
const PANEL_TITLE: &str = "Players";

/// Output buffered between flushes. An apply step has to fit so the terminal
/// never sees a cell unmarked and not yet marked again.
pub const FRAME_BUFFER_BYTES: usize = 256 * 1024;

/// Screen position, or `None` when it falls outside what the terminal can
/// address.
fn screen_pos(column: u64, row: u64) -> Option<(u16, u16)> {
    Some((u16::try_from(column).ok()?, u16::try_from(row).ok()?))
}

fn strip_controls(name: &str) -> String {
    name.chars().filter(|c| !c.is_control()).collect()
}

/// Draws the maze straight onto a terminal. After the first full draw only
/// cells whose tags change are rewritten, so updates never flicker.
pub struct TerminalSurface<W: Write> {
    out: W,
    width: u32,
    height: u32,
    cells: Vec<(Coord, CellTags)>,
    by_coord: HashMap<Coord, CellHandle>,
    grid_ready: bool,
    label_panel: bool,
    label_rows: usize,
    write_error: Option<io::Error>,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> TerminalSurface<W> {
        TerminalSurface {
            out,
            width: 0,
            height: 0,
            cells: Vec::new(),
            by_coord: HashMap::new(),
            grid_ready: false,
            label_panel: false,
            label_rows: 0,
            write_error: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn status_row(&self) -> u64 {
        GRID_TOP as u64 + self.height as u64 + 1
    }

    fn panel_column(&self) -> u64 {
        self.width as u64 * CELL_COLUMNS as u64 + PANEL_GAP as u64
    }

    /// The panel may use the rows beside the grid plus the blank row under
    /// it, never the status row.
    fn label_capacity(&self) -> usize {
        self.height as usize
    }

    fn panel_lines(&self, names: &[String]) -> Vec<String> {
        let capacity = self.label_capacity();
        if names.len() <= capacity {
            return names.iter().map(|name| strip_controls(name)).collect();
        }
        let shown = capacity.saturating_sub(1);
        let mut lines: Vec<String> = names[..shown].iter().map(|name| strip_controls(name)).collect();
        if capacity > 0 {
            lines.push(format!("+{} more", names.len() - shown));
        }
        lines
    }

    fn is_wall(&self, coord: Coord) -> bool {
        self.by_coord
            .get(&coord)
            .is_some_and(|handle| self.cells[handle.0].1.contains(CellTags::WALL))
    }

    fn glyph(&self, handle: CellHandle) -> &'static str {
        let (coord, tags) = self.cells[handle.0];
        let sides = WallSides::around(coord, self.width, self.height, |at| self.is_wall(at));
        cell_glyph(tags, sides)
    }

    fn color(tags: CellTags) -> Color {
        if tags.contains(CellTags::PLAYER) {
            Color::Yellow
        } else if tags.contains(CellTags::WALL) {
            Color::Grey
        } else {
            Color::Red
        }
    }

    fn draw_cell(&mut self, handle: CellHandle) -> io::Result<()> {
        let (coord, tags) = self.cells[handle.0];
        let column = coord.x as u64 * CELL_COLUMNS as u64;
        let row = GRID_TOP as u64 + (self.height as i64 - 1 - coord.y) as u64;
        let Some((column, row)) = screen_pos(column, row) else {
            return Ok(());
        };
        let glyph = self.glyph(handle);
        queue!(
            self.out,
            MoveTo(column, row),
            SetForegroundColor(Self::color(tags)),
            Print(glyph),
            ResetColor
        )
    }

    fn draw_grid(&mut self) -> io::Result<()> {
        for index in 0..self.cells.len() {
            self.draw_cell(CellHandle(index))?;
        }
        Ok(())
    }

    fn draw_labels(&mut self, names: &[String]) -> io::Result<()> {
        // Names come from the network; never let them carry escape sequences.
        let lines = self.panel_lines(names);
        let column = self.panel_column();
        for (index, line) in lines.iter().enumerate() {
            let Some((column, row)) = screen_pos(column, GRID_TOP as u64 + 1 + index as u64) else { break };
            queue!(self.out, MoveTo(column, row), Print(line), Clear(ClearType::UntilNewLine))?;
        }
        for index in lines.len()..self.label_rows {
            let Some((column, row)) = screen_pos(column, GRID_TOP as u64 + 1 + index as u64) else { break };
            queue!(self.out, MoveTo(column, row), Clear(ClearType::UntilNewLine))?;
        }
        self.label_rows = lines.len();
        Ok(())
    }

    fn draw_status(&mut self, status: &ConnectionStatus) -> io::Result<()> {
        let color = match status {
            ConnectionStatus::Connecting => Color::Yellow,
            ConnectionStatus::Connected { .. } => Color::Green,
            ConnectionStatus::Disconnected { .. } => Color::Red,
        };
        let Some((_, row)) = screen_pos(0, self.status_row()) else {
            return Ok(());
        };
        queue!(
            self.out,
            MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(color),
            Print(status),
            ResetColor
        )
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if self.write_error.is_none() {
                self.write_error = Some(e);
            }
        }
    }
}

impl<W: Write> TerminalSurface<BufWriter<W>> {
    /// Surface whose output only reaches `out` on [`RenderSurface::flush`].
    pub fn buffered(out: W) -> TerminalSurface<BufWriter<W>> {
        TerminalSurface::new(BufWriter::with_capacity(FRAME_BUFFER_BYTES, out))
    }
}

impl<W: Write> RenderSurface for TerminalSurface<W> {
    fn show_info(&mut self, text: &str) {
        let result = queue!(self.out, MoveTo(0, INFO_ROW), Clear(ClearType::CurrentLine), Print(text));
        self.record(result);
        let result = self.out.flush();
        self.record(result);
    }

    fn clear_info(&mut self) {
        let result = queue!(self.out, MoveTo(0, INFO_ROW), Clear(ClearType::CurrentLine));
        self.record(result);
    }

    fn begin_grid(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.cells.reserve(width as usize * height as usize);
        if let Ok((columns, rows)) = terminal::size() {
            let needed_columns = width as u64 * CELL_COLUMNS as u64;
            let needed_rows = GRID_TOP as u64 + height as u64 + 2;
            if needed_columns > columns as u64 || needed_rows > rows as u64 {
                warn!("maze is {width}x{height} cells but the terminal is only {columns}x{rows}");
            }
        }
    }

    fn insert_cell(&mut self, coord: Coord) -> CellHandle {
        let handle = CellHandle(self.cells.len());
        self.cells.push((coord, CellTags::empty()));
        self.by_coord.insert(coord, handle);
        handle
    }

    fn set_cell_tag(&mut self, cell: CellHandle, tag: CellTags, present: bool) {
        let Some((_, tags)) = self.cells.get_mut(cell.0) else { return };
        tags.set(tag, present);
        // Walls depend on their neighbours, so nothing is drawn until the
        // whole grid is known.
        if self.grid_ready {
            let result = self.draw_cell(cell);
            self.record(result);
        }
    }

    fn grid_ready(&mut self) {
        self.grid_ready = true;
        let result = self.draw_grid();
        self.record(result);
        let result = self.out.flush();
        self.record(result);
        info!("drew {}x{} maze", self.width, self.height);
    }

    fn create_label_panel(&mut self) {
        self.label_panel = true;
        let Some((column, row)) = screen_pos(self.panel_column(), GRID_TOP as u64) else { return };
        let result = queue!(self.out, MoveTo(column, row), Print(PANEL_TITLE));
        self.record(result);
    }

    fn set_label_list(&mut self, names: &[String]) {
        if !self.label_panel {
            return;
        }
        let result = self.draw_labels(names);
        self.record(result);
    }

    fn set_connection_status(&mut self, status: &ConnectionStatus) {
        let result = self.draw_status(status);
        self.record(result);
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(e) = self.write_error.take() {
            return Err(e);
        }
        self.out.flush()
    }
}

/// Raw mode + alternate screen for the lifetime of the viewer. Restores the
/// terminal when dropped, including on early return.
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn enter() -> io::Result<TerminalSession> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = crossterm::execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All)) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(TerminalSession { _private: () })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = crossterm::execute!(stdout, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridModel;
    use msgs::Maze;

    fn built() -> (GridModel, TerminalSurface<Vec<u8>>) {
        let maze = Maze { width: 3, height: 2, present_x: 2, present_y: 0, walls: vec![[1, 0]] };
        let mut surface = TerminalSurface::new(Vec::new());
        let grid = GridModel::build(&maze, &mut surface).unwrap();
        (grid, surface)
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn ansi(command: impl crossterm::Command) -> String {
        let mut sequence = String::new();
        command.write_ansi(&mut sequence).unwrap();
        sequence
    }

    #[test]
    fn nothing_drawn_before_grid_ready() {
        let maze = Maze { width: 2, height: 1, present_x: 0, present_y: 0, walls: vec![[1, 0]] };
        let mut surface = TerminalSurface::new(Vec::new());
        surface.begin_grid(maze.width, maze.height);
        let handle = surface.insert_cell(Coord::new(0, 0));
        surface.set_cell_tag(handle, CellTags::PRESENT, true);
        assert!(surface.into_inner().is_empty());
    }

    #[test]
    fn grid_ready_draws_every_cell() {
        let (_, surface) = built();
        let output = text(&surface.into_inner());
        assert!(output.contains("◆◆"));
        assert!(output.contains("┌┐"));
    }

    #[test]
    fn player_update_redraws_only_that_cell() {
        let (mut grid, mut surface) = built();
        surface.out.clear();

        grid.mark_player(Coord::new(0, 1), &mut surface).unwrap();
        surface.flush().unwrap();

        let output = text(&surface.into_inner());
        assert_eq!(output.matches("▒▒").count(), 1);
        assert!(!output.contains("◆◆"));
        // Top row, first column.
        assert!(output.contains(&ansi(MoveTo(0, GRID_TOP))));
    }

    #[test]
    fn shorter_label_list_clears_leftover_rows() {
        let (_, mut surface) = built();
        surface.create_label_panel();
        surface.set_label_list(&["Rudolph".to_string(), "Blitzen".to_string()]);
        surface.out.clear();

        surface.set_label_list(&["Rudolph".to_string()]);
        let output = text(&surface.into_inner());
        assert!(output.contains("Rudolph"));
        assert!(!output.contains("Blitzen"));
        assert_eq!(output.matches(&ansi(Clear(ClearType::UntilNewLine))).count(), 2);
    }

    #[test]
    fn label_escape_sequences_are_stripped() {
        let (_, mut surface) = built();
        surface.create_label_panel();
        surface.out.clear();
        surface.set_label_list(&["Evil\x1b[2JName".to_string()]);
        let output = text(&surface.into_inner());
        assert!(output.contains("Evil[2JName"));
        assert!(!output.contains("\x1b[2J"));
    }

    #[test]
    fn status_line_sits_below_grid() {
        let (_, mut surface) = built();
        surface.out.clear();
        surface.set_connection_status(&ConnectionStatus::Connecting);
        let output = text(&surface.into_inner());
        assert!(output.starts_with(&ansi(MoveTo(0, GRID_TOP + 3))));
        assert!(output.contains("connecting..."));
    }

    #[test]
    fn more_players_than_rows_stay_off_the_status_line() {
        let (_, mut surface) = built();
        surface.create_label_panel();
        surface.out.clear();

        let names = ["Dasher", "Dancer", "Prancer"].map(String::from);
        surface.set_label_list(&names);
        surface.set_connection_status(&ConnectionStatus::Connecting);

        let output = text(&surface.into_inner());
        // Two rows beside a 3x2 maze: one name and a summary line.
        assert!(output.contains("Dasher"));
        assert!(output.contains("+2 more"));
        assert!(!output.contains("Prancer"));
        let panel_column = 3 * CELL_COLUMNS + PANEL_GAP;
        let status_row = GRID_TOP + 3;
        assert!(!output.contains(&ansi(MoveTo(panel_column, status_row))));
        assert!(output.contains("connecting..."));
    }

    #[test]
    fn every_name_shows_when_the_panel_has_room() {
        let maze = Maze { width: 2, height: 4, present_x: 0, present_y: 0, walls: Vec::new() };
        let mut surface = TerminalSurface::new(Vec::new());
        GridModel::build(&maze, &mut surface).unwrap();
        surface.create_label_panel();
        surface.out.clear();

        surface.set_label_list(&["Comet", "Cupid", "Donner", "Blitzen"].map(String::from));
        let output = text(&surface.into_inner());
        assert!(output.contains("Blitzen"));
        assert!(!output.contains("more"));
    }

    #[test]
    fn very_wide_maze_draws_only_what_the_terminal_can_address() {
        let maze = Maze { width: 40_000, height: 1, present_x: 0, present_y: 0, walls: Vec::new() };
        let mut surface = TerminalSurface::new(Vec::new());
        let mut grid = GridModel::build(&maze, &mut surface).unwrap();
        surface.create_label_panel();
        assert!(text(&surface.out).contains(&ansi(MoveTo(0, GRID_TOP))));
        surface.out.clear();

        grid.mark_player(Coord::new(39_999, 0), &mut surface).unwrap();
        surface.set_label_list(&["Vixen".to_string()]);
        surface.flush().unwrap();
        assert!(surface.out.is_empty());

        grid.mark_player(Coord::new(1, 0), &mut surface).unwrap();
        surface.set_connection_status(&ConnectionStatus::Connecting);
        let output = text(&surface.into_inner());
        assert!(output.contains("▒▒"));
        assert!(output.contains("connecting..."));
    }

    #[test]
    fn buffered_surface_holds_a_frame_until_flush() {
        let maze = Maze { width: 20, height: 5, present_x: 0, present_y: 0, walls: Vec::new() };
        let mut surface = TerminalSurface::buffered(Vec::new());
        let mut grid = GridModel::build(&maze, &mut surface).unwrap();
        surface.out.get_mut().clear();

        for x in 0..20 {
            for y in 0..5 {
                grid.mark_player(Coord::new(x, y), &mut surface).unwrap();
            }
        }
        assert!(surface.out.get_ref().is_empty());

        surface.flush().unwrap();
        let written = surface.out.get_ref();
        assert!(written.len() > 1024);
        assert_eq!(text(written).matches("▒▒").count(), 100);
    }
}
