mod common;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use common::{FixedHeights, GEOMETRY, HEADING_HEIGHT, para, table, table_rows};
use pagewright_pdf::{
    Content, Document, Error, FragmentContent, LayoutOptions, PageGeometry, Table, TableStyle,
    TextStyle, Warning, paginate,
};

fn layout_opts() -> LayoutOptions {
    LayoutOptions::default()
}

fn doc(content: Content) -> Document {
    Document::new(content, GEOMETRY).unwrap()
}

#[test]
fn empty_document_yields_one_empty_page() {
    let document = doc(Content::new());
    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 1);
    assert!(layout.pages[0].fragments.is_empty());
    assert!(layout.warnings.is_empty());
}

#[test]
fn heading_and_tall_paragraph_share_a_page() {
    let mut content = Content::new();
    content.add_heading("Report", 1).unwrap();
    para(&mut content, 700);
    let document = doc(content);

    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 1);
    let page = &layout.pages[0];
    assert_eq!(page.fragments.len(), 2);
    assert!(page.used_height() <= 750.0);
    assert_eq!(page.fragments[1].offset, HEADING_HEIGHT + 6.0);
}

#[test]
fn table_continues_with_repeated_header() {
    let mut content = Content::new();
    // header+2 rows = 600pt, header+3 rows = 820pt on a 750pt page
    table(&mut content, 100, &[250, 250, 220]);
    let document = doc(content);

    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 2);
    assert_eq!(table_rows(&layout.pages[0]), vec![0, 1]);
    assert_eq!(table_rows(&layout.pages[1]), vec![2]);

    let FragmentContent::Table(first) = &layout.pages[0].fragments[0].content else {
        panic!("expected a table fragment");
    };
    let FragmentContent::Table(second) = &layout.pages[1].fragments[0].content else {
        panic!("expected a table fragment");
    };
    assert!(!first.repeated_header);
    assert!(second.repeated_header);
    assert_eq!(first.height(), 600.0);
    assert_eq!(second.height(), 320.0);
    let header_text = |slice: &pagewright_pdf::TableSlice<'_>| {
        slice.header.as_ref().map(|h| h.text(0))
    };
    assert_eq!(header_text(first).as_deref(), Some("h=100"));
    assert_eq!(header_text(second).as_deref(), Some("h=100"));
}

#[test]
fn headerless_table_continues_without_a_header() {
    let mut content = Content::new();
    content
        .push_table(Table::without_header(vec![
            vec!["h=400".into(), "first".into()],
            vec!["h=400".into(), "second".into()],
        ]))
        .unwrap();
    let document = doc(content);

    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 2);
    assert_eq!(table_rows(&layout.pages[0]), vec![0]);
    assert_eq!(table_rows(&layout.pages[1]), vec![1]);
    let FragmentContent::Table(second) = &layout.pages[1].fragments[0].content else {
        panic!("expected a table fragment");
    };
    assert!(second.header.is_none());
    assert!(!second.repeated_header);
    assert_eq!(second.height(), 400.0);
}

#[test]
fn header_without_room_for_a_row_moves_whole_table() {
    let mut content = Content::new();
    para(&mut content, 600);
    // 150pt left: the 100pt header fits alone, header + 200pt row does not
    table(&mut content, 100, &[200, 50]);
    let document = doc(content);

    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 2);
    assert_eq!(layout.pages[0].fragments.len(), 1);
    assert!(table_rows(&layout.pages[0]).is_empty());
    assert_eq!(table_rows(&layout.pages[1]), vec![0, 1]);
    let FragmentContent::Table(slice) = &layout.pages[1].fragments[0].content else {
        panic!("expected a table fragment");
    };
    assert!(!slice.repeated_header);
}

#[test]
fn table_without_body_rows_is_header_only() {
    let mut content = Content::new();
    table(&mut content, 40, &[]);
    let document = doc(content);

    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 1);
    let fragment = &layout.pages[0].fragments[0];
    let FragmentContent::Table(slice) = &fragment.content else {
        panic!("expected a table fragment");
    };
    assert!(slice.rows.is_empty());
    assert_eq!(fragment.height, 40.0);
}

#[test]
fn heading_follows_its_paragraph_to_the_next_page() {
    let mut content = Content::new();
    para(&mut content, 700);
    content.add_heading("Details", 2).unwrap();
    para(&mut content, 100);
    let document = doc(content);

    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 2);
    assert_eq!(layout.pages[0].fragments.len(), 1);
    let blocks: Vec<usize> = layout.pages[1]
        .fragments
        .iter()
        .map(|f| f.block_index)
        .collect();
    assert_eq!(blocks, vec![1, 2]);
}

#[test]
fn heading_stays_when_keep_with_next_is_off() {
    let mut content = Content::new();
    para(&mut content, 700);
    content.add_heading("Details", 2).unwrap();
    para(&mut content, 100);
    let document = doc(content);

    let options = LayoutOptions {
        keep_with_next: false,
        ..LayoutOptions::default()
    };
    let layout = paginate(&document, &FixedHeights, &options).unwrap();
    assert_eq!(layout.pages[0].fragments.len(), 2);
}

#[test]
fn heading_chain_moves_together() {
    let mut content = Content::new();
    para(&mut content, 680);
    content.add_heading("Part", 1).unwrap();
    content.add_heading("Chapter", 2).unwrap();
    para(&mut content, 30);
    let document = doc(content);

    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 2);
    assert_eq!(layout.pages[0].fragments.len(), 1);
    assert_eq!(layout.pages[1].fragments.len(), 3);
}

#[test]
fn heading_keeps_with_table_header_and_first_row() {
    let mut content = Content::new();
    para(&mut content, 650);
    content.add_heading("Results", 2).unwrap();
    // heading fits in the remaining 100pt; heading + header + row does not
    table(&mut content, 30, &[60]);
    let document = doc(content);

    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 2);
    assert_eq!(layout.pages[0].fragments.len(), 1);
    assert_eq!(layout.pages[1].fragments[0].block_index, 1);
}

#[test]
fn heading_on_empty_page_is_never_moved() {
    let mut content = Content::new();
    content.add_heading("Alone", 1).unwrap();
    para(&mut content, 740);
    let document = doc(content);

    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 2);
    assert_eq!(layout.pages[0].fragments[0].block_index, 0);
    assert_eq!(layout.pages[1].fragments[0].block_index, 1);
}

#[test]
fn spacer_filling_the_page_exactly_still_fits() {
    let mut content = Content::new();
    para(&mut content, 700);
    content.add_spacer(44.0).unwrap();
    let document = doc(content);
    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 1);
    assert_eq!(layout.pages[0].free_height, 0.0);

    let mut content = Content::new();
    para(&mut content, 700);
    content.add_spacer(44.5).unwrap();
    let document = doc(content);
    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 2);
}

#[test]
fn oversized_paragraph_gets_its_own_page_and_a_warning() {
    let mut content = Content::new();
    para(&mut content, 100);
    para(&mut content, 900);
    para(&mut content, 50);
    let document = doc(content);

    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 3);
    assert_eq!(layout.pages[1].fragments.len(), 1);
    assert_eq!(
        layout.warnings,
        vec![Warning::ContentOverflow {
            block_index: 1,
            page_index: 1,
            height: 900.0,
            available: 750.0,
        }]
    );
}

#[test]
fn oversized_table_row_is_placed_with_a_warning() {
    let mut content = Content::new();
    table(&mut content, 50, &[100, 800, 100]);
    let document = doc(content);

    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(layout.pages.len(), 3);
    assert_eq!(table_rows(&layout.pages[0]), vec![0]);
    assert_eq!(table_rows(&layout.pages[1]), vec![1]);
    assert_eq!(table_rows(&layout.pages[2]), vec![2]);
    assert_eq!(layout.warnings.len(), 1);
}

fn long_mixed_content() -> Content {
    let mut content = Content::new();
    for section in 0..6u32 {
        content.add_heading(format!("Section {section}"), 2).unwrap();
        para(&mut content, 40 + section * 37 % 200);
        let rows: Vec<u32> = (0..25u32).map(|i| 20 + (i * 53 + section * 7) % 70).collect();
        table(&mut content, 25, &rows);
        content.add_spacer(12.0).unwrap();
    }
    content
}

#[test]
fn fragments_never_exceed_usable_height() {
    let document = doc(long_mixed_content());
    let options = layout_opts();
    let layout = paginate(&document, &FixedHeights, &options).unwrap();
    assert!(layout.warnings.is_empty());
    assert!(layout.pages.len() > 3);

    for page in &layout.pages {
        let n = page.fragments.len() as f32;
        let total: f32 = page.fragments.iter().map(|f| f.height).sum::<f32>()
            + options.block_spacing * (n - 1.0).max(0.0);
        assert!(total <= page.usable_height + 1e-3, "page {} holds {total}", page.index);
        assert!(page.used_height() <= page.usable_height + 1e-3);
    }
}

#[test]
fn every_table_row_appears_once_with_a_header_on_each_page() {
    let document = doc(long_mixed_content());
    let layout = paginate(&document, &FixedHeights, &layout_opts()).unwrap();

    for (block_index, _) in document
        .blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| matches!(b, pagewright_pdf::Block::Table(_)))
    {
        let mut seen = Vec::new();
        let mut pages_spanned = 0;
        let mut headers = 0;
        for page in &layout.pages {
            let slices: Vec<_> = page
                .fragments
                .iter()
                .filter(|f| f.block_index == block_index)
                .collect();
            // a row is atomic: a table contributes at most one slice per page
            assert!(slices.len() <= 1);
            for fragment in slices {
                let FragmentContent::Table(slice) = &fragment.content else {
                    panic!("table block produced a non-table fragment");
                };
                pages_spanned += 1;
                if slice.header.as_ref().is_some_and(|h| h.text(0) == "h=25") {
                    headers += 1;
                }
                seen.extend(slice.body_rows());
            }
        }
        assert_eq!(seen, (0..25).collect::<Vec<_>>());
        assert_eq!(headers, pages_spanned);
    }
}

#[test]
fn layout_is_repeatable() {
    let document = doc(long_mixed_content());
    let a = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    let b = paginate(&document, &FixedHeights, &layout_opts()).unwrap();
    assert_eq!(format!("{:?}", a.pages), format!("{:?}", b.pages));
}

#[test]
fn cancelled_layout_stops_at_a_page_commit() {
    let document = doc(long_mixed_content());
    let options = LayoutOptions {
        cancel: Some(Arc::new(AtomicBool::new(true))),
        ..LayoutOptions::default()
    };
    let err = paginate(&document, &FixedHeights, &options).unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn invalid_content_is_rejected_without_appending() {
    let mut content = Content::new();
    let err = content
        .add_table(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidContent(_)));
    assert!(content.add_table(vec![], vec![]).is_err());
    assert!(content.add_heading("x", 0).is_err());
    assert!(content.add_heading("x", 4).is_err());
    assert!(content.add_spacer(-1.0).is_err());
    assert!(content.add_spacer(f32::INFINITY).is_err());
    let style = TableStyle {
        column_weights: Some(vec![1.0]),
        ..TableStyle::default()
    };
    assert!(
        content
            .add_table_with(vec!["a".into(), "b".into()], vec![], style)
            .is_err()
    );
    assert!(content.push_table(Table::without_header(vec![])).is_err());
    let stray = Table::new(vec!["a".into()], vec![vec!["1".into()]]).with_cell_style(
        1,
        0,
        pagewright_pdf::CellStyle {
            text: TextStyle::default(),
            fill: None,
        },
    );
    assert!(matches!(content.push_table(stray), Err(Error::InvalidContent(_))));
    assert!(content.is_empty());

    content.add_paragraph("ok", TextStyle::default()).unwrap();
    assert_eq!(content.len(), 1);
}

#[test]
fn geometry_without_content_area_is_rejected() {
    let geometry = PageGeometry {
        width_pt: 100.0,
        height_pt: 100.0,
        margin_pt: 50.0,
    };
    assert!(matches!(
        Document::new(Content::new(), geometry),
        Err(Error::InvalidGeometry(_))
    ));
    assert!(Document::new(Content::new(), PageGeometry::A4.with_margin(-1.0)).is_err());
}
