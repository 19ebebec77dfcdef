use crate::error::RenderError;
use crate::lookup::IdLookup;
use crate::traits::{DocumentInfo, DocumentRenderer};
use folio_layout::{Area, AreaTree};
use folio_types::Transform;
use std::io::{Seek, Write};

/// Paints every page of `tree` through `renderer`, returning the writer.
pub fn render_area_tree<W: Write + Seek + Send>(
    tree: &AreaTree,
    title: Option<String>,
    mut renderer: Box<dyn DocumentRenderer<W>>,
    writer: W,
) -> Result<W, RenderError> {
    let info = DocumentInfo {
        title,
        page_count: tree.page_count(),
        targets: IdLookup::from_tree(tree),
    };
    log::debug!(
        "Rendering {} pages with {} link targets.",
        info.page_count,
        info.targets.len()
    );
    renderer.begin_document(writer, &info)?;
    for page in tree.pages() {
        renderer.start_page(page)?;
        for region in page.areas() {
            paint(renderer.as_mut(), region, Transform::identity())?;
        }
        renderer.end_page()?;
    }
    renderer.finish()
}

fn paint<W: Write + Seek + Send>(
    renderer: &mut dyn DocumentRenderer<W>,
    area: &Area,
    transform: Transform,
) -> Result<(), RenderError> {
    renderer.paint_area(area, transform)?;
    let inner = transform.then(&area.rect);
    for child in &area.children {
        paint(renderer, child, inner)?;
    }
    renderer.end_area(area)
}
