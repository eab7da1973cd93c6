use registro_core::{
    load_table, save_table, CsvTableRepository, Record, RepoError, Table, TableRepository,
};
use std::fs;
use tempfile::TempDir;

const HEADER: &str = "ESTADO;N°;FECHA DE INGRESO;N° DE DOCUMENTO SIMPLE;ASUNTO;NOMBRE Y APELLIDO;DNI;DOMICILIO FISCAL;GIRO O MOTIVO DE LA SOLICITUD;UBICACION;N° DE CELULAR;PROCEDENTE / IMPROCEDENTE;N° DE CARTA;FECHA DE LA CARTA;FECHA DE NOTIFICACION;ANEXO;FECHA EXTRA;ASUNTO EXTRA;FOLIOS";

fn write_registry(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("registro2.csv");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn malformed_line_is_skipped_without_error() {
    let dir = TempDir::new().unwrap();
    let path = write_registry(
        &dir,
        &format!(
            "{HEADER}\n\
             AUTORIZADO;1;2024-01-10;DS-1;Permiso;Ana Quispe;01234567;Jr. Lima 1;Venta de fruta;Plaza;987654321;PROCEDENTE;C-1;2024-01-20;2024-01-25;;;;3\n\
             ESPERA;2;2024-02-01;DS-2;Permiso\n\
             ESPERA;3;2024-02-03;DS-3;Permiso;Luis Rojas;76543210;Av. Sol 5;Venta de jugos;Mercado;912345678;;;;;;;;1\n"
        ),
    );

    let table = load_table(&path).unwrap();
    assert_eq!(table.columns().len(), 19);
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0].record.get("dni"), "01234567");
    assert_eq!(table.rows()[1].record.get("n°"), "3");
    assert_eq!(table.rows()[1].index, 1);
}

#[test]
fn headers_are_normalized() {
    let dir = TempDir::new().unwrap();
    let path = write_registry(&dir, " Nombre y Apellido ;Año;PROCEDENTE / IMPROCEDENTE\nA;2024;SI\n");

    let table = load_table(&path).unwrap();
    assert_eq!(
        table.columns(),
        [
            "nombre_y_apellido".to_string(),
            "ano".to_string(),
            "procedente___improcedente".to_string()
        ]
    );
}

#[test]
fn unnamed_columns_are_absent_from_load_and_save() {
    let dir = TempDir::new().unwrap();
    let path = write_registry(&dir, "Unnamed: 0;estado;dni\n0;ESPERA;1\n1;AUTORIZADO;2\n");

    let table = load_table(&path).unwrap();
    assert_eq!(table.columns(), ["estado".to_string(), "dni".to_string()]);

    let mut leaked = Table::new(vec![
        "unnamed:_0".to_string(),
        "estado".to_string(),
    ]);
    leaked.push(
        [("unnamed:_0", "9"), ("estado", "ESPERA")]
            .into_iter()
            .collect::<Record>(),
    );
    save_table(&leaked, &path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "estado\nESPERA\n");
}

#[test]
fn save_then_load_reproduces_cells() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roundtrip.csv");
    let columns: Vec<String> = ["estado", "asunto", "dni", "n°_de_celular"]
        .into_iter()
        .map(String::from)
        .collect();
    let table = Table::from_records(
        columns,
        vec![
            [
                ("estado", "ESPERA"),
                ("asunto", "Venta; comida \"criolla\""),
                ("dni", "00012345"),
                ("n°_de_celular", ""),
            ]
            .into_iter()
            .collect::<Record>(),
            [
                ("estado", "AUTORIZADO"),
                ("asunto", "Línea 1\nLínea 2"),
                ("dni", ""),
                ("n°_de_celular", "+51 999 888 777"),
            ]
            .into_iter()
            .collect::<Record>(),
        ],
    );

    save_table(&table, &path).unwrap();
    let loaded = load_table(&path).unwrap();

    assert_eq!(loaded.columns(), table.columns());
    assert_eq!(loaded.len(), 2);
    for (expected, actual) in table.rows().iter().zip(loaded.rows()) {
        for column in table.columns() {
            assert_eq!(actual.record.get(column), expected.record.get(column));
        }
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let repo = CsvTableRepository::new(dir.path().join("missing.csv"));

    let err = repo.load_table().unwrap_err();
    assert!(matches!(err, RepoError::Io { .. }));
    assert!(err.to_string().contains("missing.csv"));
}

#[test]
fn unwritable_target_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let repo = CsvTableRepository::new(dir.path().join("no-such-dir").join("registro.csv"));

    let err = repo.save_table(&Table::new(vec!["estado".into()])).unwrap_err();
    assert!(matches!(err, RepoError::Io { .. }));
}
