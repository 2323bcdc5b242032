use comfy_table::{Cell, CellAlignment, Row};

use super::{Output, Success};
use crate::{Ctx, source};

#[derive(Debug, clap::Args)]
pub(crate) struct Demos {
    /// Manifest to list (file path or URL), instead of the configured one.
    #[arg(long, value_name = "SRC")]
    manifest: Option<String>,
}

impl Demos {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Output {
        let manifest_source = match &self.manifest {
            Some(src) => src.parse()?,
            None => ctx.manifest_source()?,
        };

        let manifest = source::manifest(&ctx.http, &manifest_source).await?;
        if manifest.demos.is_empty() {
            return Ok(format!("No demos in {manifest_source}.").into());
        }

        let mut header = Row::new();
        header
            .add_cell(Cell::new("#").set_alignment(CellAlignment::Right))
            .add_cell(Cell::new("Title"))
            .add_cell(Cell::new("File"));

        let rows = manifest
            .demos
            .iter()
            .enumerate()
            .map(|(i, demo)| {
                let title = match &demo.icon {
                    Some(icon) => format!("{} ({icon})", demo.title),
                    None => demo.title.clone(),
                };

                let mut row = Row::new();
                row.add_cell(Cell::new(i + 1).set_alignment(CellAlignment::Right))
                    .add_cell(Cell::new(title))
                    .add_cell(Cell::new(&demo.file));
                row
            })
            .collect();

        Ok(Success::Table { header, rows })
    }
}
