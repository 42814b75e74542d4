use std::fs::{self, File};

use anyhow::Result;
use image::{GrayImage, Luma};

use streetslip::core::model::RawToken;
use streetslip::export::read_records;
use streetslip::ocr::write_token_stream;
use streetslip::parser::ParseOptions;
use streetslip::pipeline::{
    combine_page, export_page, parse_column_file, process_page, survey, PAGE_CROP, PAGE_RECORDS,
};
use streetslip::segment::deskew::rotate;
use streetslip::segment::{extract_columns, prepare_page, DeskewParams};

/// A blank 1000x800 directory page: a title, a top rule and four column
/// dividers, rotated slightly as a scanner would leave it.
fn skewed_page() -> GrayImage {
    let mut img = GrayImage::from_pixel(1000, 800, Luma([255]));
    for x in 400..600 {
        for y in 8..20 {
            img.put_pixel(x, y, Luma([0]));
        }
    }
    for x in 20..980 {
        for y in 40..43 {
            img.put_pixel(x, y, Luma([0]));
        }
    }
    for divider in [200, 400, 600, 800] {
        for x in divider - 2..divider + 3 {
            for y in 40..780 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }
    rotate(&img, 0.25, 255)
}

fn token(text: &str, left: i32, line: u32, height: i32) -> RawToken {
    RawToken {
        text: text.to_string(),
        conf: 88.0,
        left,
        top: 20 + line as i32 * 50,
        width: 40,
        height,
        block_num: 1,
        par_num: 1,
        line_num: line,
    }
}

fn data_rows(pairs: &[(&str, &str)], first_line: u32) -> Vec<RawToken> {
    pairs
        .iter()
        .enumerate()
        .flat_map(|(i, (new, old))| {
            let line = first_line + i as u32;
            [token(new, 10, line, 30), token(old, 70, line, 30)]
        })
        .collect()
}

/// Two streets of four addresses spread over three columns.
fn scripted_columns() -> Vec<Vec<RawToken>> {
    let mut first = vec![token("Main", 10, 1, 45), token("Street", 60, 1, 45)];
    first.extend(data_rows(&[("101", "17"), ("103", "19")], 2));

    let second = data_rows(&[("105", "21"), ("107", "23")], 1);

    let mut third = vec![token("Elm", 10, 1, 45), token("Avenue", 60, 1, 45)];
    third.extend(data_rows(&[("2", "4"), ("4", "6"), ("6", "8"), ("8", "10")], 2));

    vec![first, second, third, Vec::new(), Vec::new()]
}

#[test]
fn skewed_page_segments_into_five_columns() -> Result<()> {
    let params = DeskewParams::default();
    let prepared = prepare_page(&skewed_page(), &params)?;
    assert_eq!(prepared.width(), 1000);
    assert!(prepared.height() < 800);

    let columns = extract_columns(&prepared, &params)?;
    assert_eq!(columns.len(), 5);
    assert_eq!(columns[0].0.start, 0);
    assert_eq!(columns[4].0.end, 1000);
    for (span, image) in &columns[1..4] {
        assert!((195..=205).contains(&span.len()), "span {span:?}");
        assert_eq!(image.dimensions(), (span.len(), prepared.height()));
    }
    Ok(())
}

#[test]
fn page_reconstruction_yields_ordered_records() -> Result<()> {
    let params = DeskewParams::default();
    let prepared = prepare_page(&skewed_page(), &params)?;
    let spans: Vec<_> = extract_columns(&prepared, &params)?
        .into_iter()
        .map(|(span, _)| span)
        .collect();

    let columns = spans.into_iter().zip(scripted_columns()).collect();
    let page = process_page("0007", columns, None, &ParseOptions::default())?;
    let records = page.records();

    let rows: Vec<(String, String, usize)> = records
        .iter()
        .map(|r| (r.street.clone(), r.new.clone(), r.column))
        .collect();
    let expected: Vec<(String, String, usize)> = [
        ("Main Street", "101", 1),
        ("Main Street", "103", 1),
        ("Main Street", "105", 2),
        ("Main Street", "107", 2),
        ("Elm Avenue", "2", 3),
        ("Elm Avenue", "4", 3),
        ("Elm Avenue", "6", 3),
        ("Elm Avenue", "8", 3),
    ]
    .into_iter()
    .map(|(s, n, c)| (s.to_string(), n.to_string(), c))
    .collect();
    assert_eq!(rows, expected);
    assert!(records.iter().all(|r| !r.flag));
    assert!(records.iter().all(|r| r.page == "0007"));

    let out = tempfile::tempdir()?;
    export_page(&page, out.path())?;
    let written = read_records(File::open(out.path().join(PAGE_RECORDS))?)?;
    assert_eq!(written, records);
    assert!(out.path().join("page.json").exists());
    Ok(())
}

#[test]
fn column_files_chain_through_a_page_directory() -> Result<()> {
    let working = tempfile::tempdir()?;
    let page_dir = working.path().join("0007");
    fs::create_dir(&page_dir)?;
    fs::write(page_dir.join(PAGE_CROP), "")?;
    fs::write(page_dir.join("column-1.png"), "")?;

    assert_eq!(survey(working.path())?.unrecognized, vec!["0007"]);

    let options = ParseOptions::default();
    for (idx, tokens) in scripted_columns().iter().enumerate() {
        let id = idx + 1;
        let raw = page_dir.join(format!("column-{id}-raw.csv"));
        write_token_stream(File::create(&raw)?, tokens)?;
        parse_column_file(&raw, &page_dir.join(format!("column-{id}-ocr.csv")), None, &options)?;
    }

    assert_eq!(combine_page(&page_dir)?, 8);
    let records = read_records(File::open(page_dir.join(PAGE_RECORDS))?)?;
    assert_eq!(records[2].street, "Main Street");
    assert_eq!(records[2].column, 2);
    assert_eq!(records[7].old, "10");
    assert_eq!(records[0].new_bbox, "(10, 120, 50, 150)");
    assert!(survey(working.path())?.is_clean());
    Ok(())
}
