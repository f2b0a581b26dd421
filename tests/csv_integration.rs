mod common;

use std::{
    error::Error,
    io::{self, ErrorKind},
};

use common::{MockFile, init_logger};

use bistro_batch::{
    BatchError,
    core::{
        item::{ItemReader, ItemWriter, PassThroughProcessor},
        record::{HeaderSet, Record, Value},
        step::{StepBuilder, StepStatus},
    },
    error::ImportError,
    item::csv::{
        csv_reader::{CsvItemReaderBuilder, ParseMode, parse, parse_with},
        csv_writer::{CsvItemWriterBuilder, serialize},
        validator::{ImportResult, validate},
    },
};

fn menu_headers() -> HeaderSet {
    HeaderSet::new(["nome", "categoria", "preco", "disponivel"])
}

fn menu_records() -> Vec<Record> {
    vec![
        Record::new()
            .with("nome", "Pizza Margherita")
            .with("categoria", "Pizzas")
            .with("preco", 42.0)
            .with("disponivel", true),
        Record::new()
            .with("nome", "Caipirinha")
            .with("categoria", "Bebidas")
            .with("preco", 15.5)
            .with("disponivel", false),
        Record::new()
            .with("nome", "Pudim")
            .with("categoria", "Sobremesas")
            .with("preco", Value::Null)
            .with("disponivel", Value::Integer(1)),
    ]
}

#[test]
fn serialized_table_parses_back_field_for_field() {
    let headers = menu_headers();
    let records = menu_records();

    let parsed = parse(&serialize(&records, Some(&headers)));

    assert_eq!(parsed.len(), records.len());
    for (original, read) in records.iter().zip(&parsed) {
        assert_eq!(HeaderSet::of(read), headers);
        for name in headers.iter() {
            assert_eq!(read.text(name), original.text(name));
        }
    }
    assert_eq!(parsed[0].text("preco").parse::<f64>().ok(), Some(42.0));
    assert_eq!(parsed[2].text("preco"), "");
}

#[test]
fn quoted_values_survive_strict_parsing() -> Result<(), Box<dyn Error>> {
    let headers = HeaderSet::new(["nome", "descricao"]);
    let records = vec![
        Record::new()
            .with("nome", "Pizza, grande")
            .with("descricao", "Molho \"da casa\""),
    ];

    let text = serialize(&records, Some(&headers));
    assert_eq!(
        text,
        "nome,descricao\n\"Pizza, grande\",\"Molho \"\"da casa\"\"\""
    );

    let parsed = parse_with(&text, b',', ParseMode::Strict)?;
    assert_eq!(parsed[0].text("nome"), "Pizza, grande");
    assert_eq!(parsed[0].text("descricao"), "Molho \"da casa\"");

    Ok(())
}

#[test]
fn naive_parsing_splits_quoted_commas() {
    let parsed = parse("nome,preco\n\"Pizza, grande\",42");

    assert_eq!(parsed[0].text("nome"), "Pizza");
    assert_eq!(parsed[0].text("preco"), "grande");
}

#[test]
fn missing_headers_are_listed_in_required_order() {
    let records = vec![Record::new().with("nome", "x")];
    let required = HeaderSet::new(["nome", "categoria"]);

    assert_eq!(
        validate(records, &required),
        ImportResult::MissingHeaders(vec!["categoria".to_owned()])
    );
}

#[test]
fn empty_or_header_only_text_has_no_records() {
    assert!(parse("").is_empty());
    assert!(parse("onlyHeaderLine").is_empty());
    assert!(parse("\r\n  \n").is_empty());
}

#[test]
fn short_rows_are_padded_with_empty_values() {
    let parsed = parse("nome,categoria,quantidade\r\nSal,Temperos\r\n");

    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].text("categoria"), "Temperos");
    assert_eq!(parsed[0].get("quantidade"), Some(&Value::from("")));
}

#[test]
fn reader_feeds_writer_through_step() -> Result<(), Box<dyn Error>> {
    init_logger();

    let reader = CsvItemReaderBuilder::new()
        .required_headers(HeaderSet::new(["nome"]))
        .from_text("nome, preco\n Arroz ,4.5\n\"Sal\",2")?;
    let writer = CsvItemWriterBuilder::new()
        .headers(HeaderSet::new(["preco", "nome"]))
        .from_writer(Vec::new());

    let step = StepBuilder::new()
        .name("copy")
        .reader(&reader)
        .processor(&PassThroughProcessor)
        .writer(&writer)
        .chunk(1)
        .build()?;
    let execution = step.execute();

    assert_eq!(execution.status, StepStatus::Success);
    assert_eq!(execution.read_count, 2);
    assert_eq!(execution.write_count, 2);
    assert_eq!(writer.into_string()?, "preco,nome\n4.5,Arroz\n2,Sal");

    Ok(())
}

#[test]
fn reader_open_reports_missing_columns() -> Result<(), Box<dyn Error>> {
    let reader = CsvItemReaderBuilder::new()
        .required_headers(HeaderSet::new(["nome", "categoria", "preco"]))
        .from_text("nome\nSuco")?;

    assert_eq!(
        reader.open(),
        Err(BatchError::Import(ImportError::MissingHeaders(vec![
            "categoria".into(),
            "preco".into()
        ])))
    );

    Ok(())
}

#[test]
fn write_failure_stops_the_step() -> Result<(), Box<dyn Error>> {
    init_logger();

    let reader = CsvItemReaderBuilder::new().from_text("nome,preco\nArroz,4.5\nSal,2")?;

    let mut file = MockFile::default();
    file.expect_write()
        .times(1)
        .returning(|_buf| Err(io::Error::from(ErrorKind::PermissionDenied)));
    let writer = CsvItemWriterBuilder::new().from_writer(file);

    let step = StepBuilder::new()
        .reader(&reader)
        .processor(&PassThroughProcessor)
        .writer(&writer)
        .chunk(1)
        .build()?;
    let execution = step.execute();

    assert_eq!(execution.status, StepStatus::Error);
    assert_eq!(execution.read_count, 1);
    assert_eq!(execution.write_count, 0);
    assert_eq!(execution.write_error_count, 1);
    assert!(matches!(execution.errors[0], BatchError::ItemWriter(_)));

    Ok(())
}

#[test]
fn empty_chunks_write_nothing() -> Result<(), Box<dyn Error>> {
    let writer = CsvItemWriterBuilder::new()
        .headers(menu_headers())
        .from_writer(Vec::new());

    writer.write(&Vec::<Record>::new())?;
    writer.flush()?;

    assert_eq!(writer.into_string()?, "");
    Ok(())
}
