/// Column alignment inside a [`Table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Monospace table rendered inside a Discord code block.
/// Widths are counted in chars so `৳` amounts line up.
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl Table {
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths = headers.iter().map(|h| h.chars().count()).collect();
        let aligns = vec![Align::Left; headers.len()];
        let headers = headers.iter().map(|h| h.to_string()).collect();
        Table {
            headers,
            aligns,
            rows: Vec::new(),
            col_widths,
        }
    }

    pub fn align(mut self, column: usize, align: Align) -> Self {
        if let Some(slot) = self.aligns.get_mut(column) {
            *slot = align;
        }
        self
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, col) in row.iter().enumerate() {
            if let Some(width) = self.col_widths.get_mut(i) {
                *width = (*width).max(col.chars().count());
            }
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut output = String::from("```\n");
        output.push_str(&self.render_row(&self.headers));
        output.push('\n');
        output.push_str(&self.render_separator());
        output.push('\n');
        for row in &self.rows {
            output.push_str(&self.render_row(row));
            output.push('\n');
        }
        output.push_str("```");
        output
    }

    fn render_row(&self, row: &[String]) -> String {
        let cells: Vec<String> = row
            .iter()
            .zip(self.col_widths.iter().zip(&self.aligns))
            .map(|(col, (&width, align))| {
                let padding = " ".repeat(width.saturating_sub(col.chars().count()));
                match align {
                    Align::Left => format!("{}{}", col, padding),
                    Align::Right => format!("{}{}", padding, col),
                }
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let mut table = Table::new(vec!["Type", "Amount"]).align(1, Align::Right);
        table.add_row(vec!["deposit".to_string(), "৳1,000".to_string()]);
        table.add_row(vec!["transfer".to_string(), "৳50".to_string()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "```");
        assert_eq!(lines[1], "Type     | Amount");
        assert_eq!(lines[2], "---------+-------");
        assert_eq!(lines[3], "deposit  | ৳1,000");
        assert_eq!(lines[4], "transfer |    ৳50");
        assert!(!table.is_empty());
    }
}
