use chrono::NaiveDate;
use registro_core::{
    load_table, CsvTableRepository, FieldKind, FormValue, FormValues, IndexBounds, RecordService,
    WorkflowError,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const REGISTRY: &str = "\
ESTADO;N°;FECHA DE INGRESO;NOMBRE Y APELLIDO;DNI;FECHA DE LA CARTA
AUTORIZADO;1;10/01/2024;Ana Quispe;01234567;2024-01-20
ESPERA;2;2024-02-01;Luis Rojas;76543210;
AUTORIZADO;3;2024-02-03;María Flores;11223344;por confirmar
";

fn setup() -> (TempDir, PathBuf, RecordService<CsvTableRepository>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registro2.csv");
    fs::write(&path, REGISTRY).unwrap();
    let service = RecordService::new(CsvTableRepository::new(&path));
    (dir, path, service)
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn view_reports_filtered_rows_metrics_and_bounds() {
    let (_dir, _path, service) = setup();
    let view = service.view("autorizado").unwrap();

    assert_eq!(view.table.len(), 3);
    assert_eq!(view.filtered.len(), 2);
    assert_eq!(view.selection_bounds(), Some(IndexBounds { min: 0, max: 2 }));

    let metrics = view.metrics();
    assert_eq!(metrics.total, 2);
    assert_eq!(metrics.authorized, Some(2));
    assert_eq!(metrics.waiting, Some(1));

    let chart = view.status_distribution().unwrap();
    assert_eq!(chart[0].status, "AUTORIZADO");
    assert_eq!(chart[0].count, 2);
}

#[test]
fn add_form_describes_every_column() {
    let (_dir, _path, service) = setup();
    let fields = service.add_form().unwrap();

    assert_eq!(fields.len(), 6);
    assert_eq!(fields[2].label, "FECHA DE INGRESO");
    assert_eq!(fields[2].kind, FieldKind::Date);
    assert_eq!(fields[4].kind, FieldKind::Text);
}

#[test]
fn add_with_only_intake_date_leaves_other_fields_empty() {
    let (_dir, path, service) = setup();
    let mut values = FormValues::new();
    values.insert("fecha_de_ingreso".into(), FormValue::Date(ymd(2024, 3, 15)));

    let index = service.add_record(&values).unwrap();
    assert_eq!(index, 3);

    let table = load_table(&path).unwrap();
    assert_eq!(table.len(), 4);
    let last = &table.rows()[3].record;
    for column in table.columns() {
        let expected = if column == "fecha_de_ingreso" { "2024-03-15" } else { "" };
        assert_eq!(last.get(column), expected, "column {column}");
    }
}

#[test]
fn add_rejects_unknown_columns_without_writing() {
    let (_dir, path, service) = setup();
    let mut values = FormValues::new();
    values.insert("telefono".into(), FormValue::Text("1".into()));

    let err = service.add_record(&values).unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownColumn(column) if column == "telefono"));
    assert_eq!(fs::read_to_string(&path).unwrap(), REGISTRY);
}

#[test]
fn add_accepts_unvalidated_values() {
    let (_dir, path, service) = setup();
    let mut values = FormValues::new();
    values.insert("dni".into(), FormValue::Text("no tiene".into()));

    service.add_record(&values).unwrap();
    let table = load_table(&path).unwrap();
    assert_eq!(table.rows()[3].record.get("dni"), "no tiene");
}

#[test]
fn edit_form_prefills_day_first_dates_with_today_fallback() {
    let (_dir, _path, service) = setup();
    let today = ymd(2025, 6, 30);

    let form = service.edit_form_as_of("", 0, today).unwrap();
    assert_eq!(form.index, 0);
    assert_eq!(form.fields[2].value, FormValue::Date(ymd(2024, 1, 10)));

    let form = service.edit_form_as_of("", 1, today).unwrap();
    assert_eq!(form.fields[5].value, FormValue::Date(today));

    let form = service.edit_form_as_of("", 2, today).unwrap();
    assert_eq!(form.fields[5].value, FormValue::Date(today));
    assert_eq!(form.fields[3].value, FormValue::Text("María Flores".into()));
}

#[test]
fn edit_overwrites_cells_and_normalizes_dates() {
    let (_dir, path, service) = setup();
    let today = ymd(2025, 6, 30);
    let mut overrides = FormValues::new();
    overrides.insert("estado".into(), FormValue::Text("AUTORIZADO".into()));

    service
        .edit_record_as_of("espera", 1, &overrides, today)
        .unwrap();

    let table = load_table(&path).unwrap();
    let edited = &table.rows()[1].record;
    assert_eq!(edited.get("estado"), "AUTORIZADO");
    assert_eq!(edited.get("nombre_y_apellido"), "Luis Rojas");
    assert_eq!(edited.get("fecha_de_ingreso"), "2024-02-01");
    assert_eq!(edited.get("fecha_de_la_carta"), "2025-06-30");
    assert_eq!(table.rows()[0].record.get("fecha_de_ingreso"), "10/01/2024");
    assert_eq!(table.len(), 3);
}

#[test]
fn edit_without_overrides_keeps_stored_date_spellings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registro2.csv");
    fs::write(
        &path,
        "ESTADO;FECHA DE INGRESO;FECHA DE LA CARTA;FECHA EXTRA\n\
         ESPERA;2024/03/15;15/03/2024 08:30;2024.03.15\n",
    )
    .unwrap();
    let service = RecordService::new(CsvTableRepository::new(&path));

    service
        .edit_record_as_of("", 0, &FormValues::new(), ymd(2026, 10, 19))
        .unwrap();

    let table = load_table(&path).unwrap();
    let edited = &table.rows()[0].record;
    assert_eq!(edited.get("estado"), "ESPERA");
    assert_eq!(edited.get("fecha_de_ingreso"), "2024-03-15");
    assert_eq!(edited.get("fecha_de_la_carta"), "2024-03-15");
    assert_eq!(edited.get("fecha_extra"), "2024-03-15");
}

#[test]
fn edit_and_delete_are_bounded_to_visible_rows() {
    let (_dir, path, service) = setup();
    let overrides = FormValues::new();

    let err = service.edit_record("espera", 2, &overrides).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::IndexOutOfRange { index: 2, min: 1, max: 1 }
    ));

    let err = service.delete_record("autorizado", 1).unwrap_err();
    assert!(matches!(err, WorkflowError::RowNotVisible(1)));

    let err = service.delete_record("nadie", 0).unwrap_err();
    assert!(matches!(err, WorkflowError::NoVisibleRows));

    assert_eq!(fs::read_to_string(&path).unwrap(), REGISTRY);
}

#[test]
fn delete_reindexes_remaining_rows() {
    let (_dir, path, service) = setup();

    let removed = service.delete_record("", 1).unwrap();
    assert_eq!(removed.get("nombre_y_apellido"), "Luis Rojas");

    let table = load_table(&path).unwrap();
    let rows: Vec<(usize, &str)> = table
        .rows()
        .iter()
        .map(|row| (row.index, row.record.get("n°")))
        .collect();
    assert_eq!(rows, vec![(0, "1"), (1, "3")]);
}

#[test]
fn exports_do_not_touch_storage() {
    let (_dir, path, service) = setup();

    let csv = String::from_utf8(service.export_csv("espera").unwrap()).unwrap();
    assert_eq!(
        csv,
        "estado;n°;fecha_de_ingreso;nombre_y_apellido;dni;fecha_de_la_carta\n\
         ESPERA;2;2024-02-01;Luis Rojas;76543210;\n"
    );

    let workbook = service.export_xlsx("").unwrap();
    assert!(workbook.starts_with(b"PK"));
    assert_eq!(fs::read_to_string(&path).unwrap(), REGISTRY);
}

#[test]
fn missing_storage_fails_every_action() {
    let dir = TempDir::new().unwrap();
    let service = RecordService::new(CsvTableRepository::new(dir.path().join("absent.csv")));

    assert!(matches!(service.view(""), Err(WorkflowError::Repo(_))));
    assert!(matches!(
        service.add_record(&FormValues::new()),
        Err(WorkflowError::Repo(_))
    ));
    assert!(matches!(service.export_csv(""), Err(WorkflowError::Repo(_))));
}
