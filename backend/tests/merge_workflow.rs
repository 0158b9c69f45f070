//! End-to-end merges through the engine: extract, map, merge, package.

mod support;

use chrono::{TimeZone, Utc};
use common::model::merge::RenderedContent;
use docmerge_server::engine::batch::merge_all;
use docmerge_server::engine::docx::DocxTemplate;
use docmerge_server::engine::extract::extract_text_placeholders;
use docmerge_server::engine::mapping::{auto_map, is_complete, set_mapping};
use docmerge_server::engine::package::package_all_at;
use docmerge_server::engine::render::LoadedTemplate;
use docmerge_server::ingest::csv::parse_dataset;
use pretty_assertions::assert_eq;
use std::io::{Cursor, Read};
use support::docx;
use zip::ZipArchive;

fn archive_entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut entry = zip.by_index(i).unwrap();
            let mut body = Vec::new();
            entry.read_to_end(&mut body).unwrap();
            (entry.name().to_string(), body)
        })
        .collect()
}

#[test]
fn text_template_merges_every_csv_row_into_an_archive() {
    let dataset = parse_dataset(b"name;email\nAnn;ann@example.com\nBob;bob@example.com\n").unwrap();
    let template = LoadedTemplate::text("Hi {{Name}} <{{ Email }}>");
    assert_eq!(template.placeholders(), extract_text_placeholders("Hi {{Name}} <{{ Email }}>"));

    let mappings = auto_map(template.placeholders(), &dataset.field_names);
    assert!(is_complete(template.placeholders(), &mappings));

    let documents = merge_all(&template, &dataset, &mappings).unwrap();
    assert_eq!(
        documents.iter().map(|d| d.content.clone()).collect::<Vec<_>>(),
        vec![
            RenderedContent::Html("Hi Ann <ann@example.com>".into()),
            RenderedContent::Html("Hi Bob <bob@example.com>".into()),
        ]
    );

    let stamp = Utc.timestamp_millis_opt(1_000).unwrap();
    let archive = package_all_at(&documents, stamp).unwrap();
    assert_eq!(archive.file_name, "merged-documents-1000.zip");
    assert_eq!(
        archive_entries(archive.bytes),
        vec![
            ("document-1.html".to_string(), b"Hi Ann <ann@example.com>".to_vec()),
            ("document-2.html".to_string(), b"Hi Bob <bob@example.com>".to_vec()),
        ]
    );
}

#[test]
fn manual_remapping_completes_a_partial_mapping() {
    let dataset = parse_dataset(b"Full Name,Town\nAnn,Oslo\n").unwrap();
    let template = LoadedTemplate::text("{{Name}} from {{Town}}");

    let auto = auto_map(template.placeholders(), &dataset.field_names);
    assert!(!is_complete(template.placeholders(), &auto));

    let mappings = set_mapping(&auto, "Name", "Full Name");
    let documents = merge_all(&template, &dataset, &mappings).unwrap();
    assert_eq!(documents[0].content, RenderedContent::Html("Ann from Oslo".into()));
}

#[test]
fn word_template_produces_one_docx_per_row() {
    let bytes = docx(&[&["Dear {Na", "me},"], &["Your total is {Total}."]]);
    let template = LoadedTemplate::word(DocxTemplate::load(&bytes).unwrap()).unwrap();
    assert_eq!(template.placeholders(), ["Name", "Total"]);

    let dataset = parse_dataset(b"Name,Total\nAnn & Co,12\nBob,\n").unwrap();
    let mappings = auto_map(template.placeholders(), &dataset.field_names);
    let documents = merge_all(&template, &dataset, &mappings).unwrap();

    let texts: Vec<String> = documents
        .iter()
        .map(|doc| match &doc.content {
            RenderedContent::Docx(bytes) => DocxTemplate::load(bytes).unwrap().full_text().unwrap(),
            other => panic!("expected a docx, got {other:?}"),
        })
        .collect();
    assert_eq!(
        texts,
        vec!["Dear Ann & Co,Your total is 12.", "Dear Bob,Your total is ."]
    );

    let archive = package_all_at(&documents, Utc::now()).unwrap();
    let names: Vec<String> = archive_entries(archive.bytes).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["document-1.docx", "document-2.docx"]);
}
