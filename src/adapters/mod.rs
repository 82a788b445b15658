pub mod csv_importer;
