use codestore_core::{ColumnDef, ForeignKey, IndexDef, Schema, Table, UniqueConstraint, VirtualTable};
use std::collections::BTreeMap;

/// The declarative schema this engine reconciles every database against
/// (spec §3, §4.2). A fresh database is brought up to this shape by
/// `SchemaPlanner::generate_migration_sql` alone; an existing one is
/// diffed against it column-by-column and migrated in place.
pub fn declarative_schema() -> Schema {
  let mut tables = BTreeMap::new();

  tables.insert(
    "db_settings".to_string(),
    Table {
      columns: vec![ColumnDef::new("key", "TEXT").primary_key(), ColumnDef::new("value", "TEXT")],
      ..Default::default()
    },
  );

  tables.insert(
    "projects".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "TEXT").primary_key(),
        ColumnDef::new("root_path", "TEXT").not_null(),
        ColumnDef::new("name", "TEXT").not_null(),
        ColumnDef::new("comment", "TEXT"),
        ColumnDef::new("watch_dir_id", "TEXT"),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["watch_dir_id".to_string()],
        references_table: "watch_dirs".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("SET NULL".to_string()),
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "watch_dirs".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "TEXT").primary_key(),
        ColumnDef::new("path", "TEXT").not_null(),
      ],
      unique_constraints: vec![UniqueConstraint {
        columns: vec!["path".to_string()],
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "datasets".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "TEXT").primary_key(),
        ColumnDef::new("project_id", "TEXT").not_null(),
        ColumnDef::new("root_path", "TEXT").not_null(),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["project_id".to_string()],
        references_table: "projects".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "files".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("project_id", "TEXT").not_null(),
        ColumnDef::new("dataset_id", "TEXT").not_null(),
        ColumnDef::new("watch_dir_id", "TEXT"),
        ColumnDef::new("path", "TEXT").not_null(),
        ColumnDef::new("relative_path", "TEXT").not_null(),
        ColumnDef::new("lines", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("last_modified", "REAL").not_null(),
        ColumnDef::new("has_docstring", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("deleted", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("original_path", "TEXT"),
        ColumnDef::new("version_dir", "TEXT"),
        ColumnDef::new("needs_chunking", "INTEGER").not_null().default_value("1"),
      ],
      foreign_keys: vec![
        ForeignKey {
          columns: vec!["project_id".to_string()],
          references_table: "projects".to_string(),
          references_columns: vec!["id".to_string()],
          on_delete: Some("CASCADE".to_string()),
        },
        ForeignKey {
          columns: vec!["dataset_id".to_string()],
          references_table: "datasets".to_string(),
          references_columns: vec!["id".to_string()],
          on_delete: Some("CASCADE".to_string()),
        },
      ],
      unique_constraints: vec![UniqueConstraint {
        columns: vec!["dataset_id".to_string(), "path".to_string()],
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "classes".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("file_id", "INTEGER").not_null(),
        ColumnDef::new("name", "TEXT").not_null(),
        ColumnDef::new("line", "INTEGER").not_null(),
        ColumnDef::new("end_line", "INTEGER"),
        ColumnDef::new("docstring", "TEXT"),
        ColumnDef::new("bases", "TEXT").not_null().default_value("'[]'"),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["file_id".to_string()],
        references_table: "files".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "methods".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("class_id", "INTEGER").not_null(),
        ColumnDef::new("name", "TEXT").not_null(),
        ColumnDef::new("line", "INTEGER").not_null(),
        ColumnDef::new("end_line", "INTEGER"),
        ColumnDef::new("args", "TEXT").not_null().default_value("'[]'"),
        ColumnDef::new("docstring", "TEXT"),
        ColumnDef::new("is_abstract", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("has_pass", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("has_not_implemented", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("complexity", "INTEGER"),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["class_id".to_string()],
        references_table: "classes".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "functions".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("file_id", "INTEGER").not_null(),
        ColumnDef::new("name", "TEXT").not_null(),
        ColumnDef::new("line", "INTEGER").not_null(),
        ColumnDef::new("end_line", "INTEGER"),
        ColumnDef::new("args", "TEXT").not_null().default_value("'[]'"),
        ColumnDef::new("docstring", "TEXT"),
        ColumnDef::new("complexity", "INTEGER"),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["file_id".to_string()],
        references_table: "files".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "imports".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("file_id", "INTEGER").not_null(),
        ColumnDef::new("name", "TEXT").not_null(),
        ColumnDef::new("module", "TEXT"),
        ColumnDef::new("import_type", "TEXT").not_null(),
        ColumnDef::new("line", "INTEGER").not_null(),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["file_id".to_string()],
        references_table: "files".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "issues".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("target_kind", "TEXT").not_null(),
        ColumnDef::new("target_file_id", "INTEGER"),
        ColumnDef::new("target_project_id", "TEXT"),
        ColumnDef::new("target_class_id", "INTEGER"),
        ColumnDef::new("target_method_id", "INTEGER"),
        ColumnDef::new("target_function_id", "INTEGER"),
        ColumnDef::new("issue_type", "TEXT").not_null(),
        ColumnDef::new("line", "INTEGER"),
        ColumnDef::new("description", "TEXT").not_null(),
        ColumnDef::new("metadata", "TEXT"),
      ],
      ..Default::default()
    },
  );

  tables.insert(
    "usages".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("file_id", "INTEGER").not_null(),
        ColumnDef::new("line", "INTEGER").not_null(),
        ColumnDef::new("usage_type", "TEXT").not_null(),
        ColumnDef::new("target_type", "TEXT").not_null(),
        ColumnDef::new("target_class", "TEXT"),
        ColumnDef::new("target_name", "TEXT").not_null(),
        ColumnDef::new("context", "TEXT"),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["file_id".to_string()],
        references_table: "files".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "entity_cross_refs".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("caller_kind", "TEXT").not_null(),
        ColumnDef::new("caller_class_id", "INTEGER"),
        ColumnDef::new("caller_method_id", "INTEGER"),
        ColumnDef::new("caller_function_id", "INTEGER"),
        ColumnDef::new("callee_kind", "TEXT").not_null(),
        ColumnDef::new("callee_class_id", "INTEGER"),
        ColumnDef::new("callee_method_id", "INTEGER"),
        ColumnDef::new("callee_function_id", "INTEGER"),
        ColumnDef::new("ref_type", "TEXT").not_null(),
        ColumnDef::new("file_id", "INTEGER").not_null(),
        ColumnDef::new("line", "INTEGER").not_null(),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["file_id".to_string()],
        references_table: "files".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "ast_trees".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("file_id", "INTEGER").not_null(),
        ColumnDef::new("ast_hash", "TEXT").not_null(),
        ColumnDef::new("tree", "TEXT").not_null(),
        ColumnDef::new("file_mtime", "REAL").not_null(),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["file_id".to_string()],
        references_table: "files".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      unique_constraints: vec![UniqueConstraint {
        columns: vec!["file_id".to_string(), "ast_hash".to_string()],
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "cst_trees".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("file_id", "INTEGER").not_null(),
        ColumnDef::new("cst_hash", "TEXT").not_null(),
        ColumnDef::new("tree", "TEXT").not_null(),
        ColumnDef::new("file_mtime", "REAL").not_null(),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["file_id".to_string()],
        references_table: "files".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      unique_constraints: vec![UniqueConstraint {
        columns: vec!["file_id".to_string(), "cst_hash".to_string()],
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "code_content".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("file_id", "INTEGER").not_null(),
        ColumnDef::new("owner_kind", "TEXT").not_null(),
        ColumnDef::new("owner_class_id", "INTEGER"),
        ColumnDef::new("owner_method_id", "INTEGER"),
        ColumnDef::new("owner_function_id", "INTEGER"),
        ColumnDef::new("content", "TEXT").not_null(),
        ColumnDef::new("docstring", "TEXT"),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["file_id".to_string()],
        references_table: "files".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "code_chunks".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("file_id", "INTEGER").not_null(),
        ColumnDef::new("project_id", "TEXT").not_null(),
        ColumnDef::new("chunk_uuid", "TEXT").not_null(),
        ColumnDef::new("chunk_type", "TEXT").not_null(),
        ColumnDef::new("chunk_text", "TEXT").not_null(),
        ColumnDef::new("chunk_ordinal", "INTEGER").not_null(),
        ColumnDef::new("class_id", "INTEGER"),
        ColumnDef::new("method_id", "INTEGER"),
        ColumnDef::new("function_id", "INTEGER"),
        ColumnDef::new("line", "INTEGER"),
        ColumnDef::new("ast_node_type", "TEXT"),
        ColumnDef::new("source_type", "TEXT"),
        ColumnDef::new("binding_level", "TEXT"),
        ColumnDef::new("vector_id", "INTEGER"),
        ColumnDef::new("embedding_model", "TEXT"),
        ColumnDef::new("embedding_vector", "TEXT"),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["file_id".to_string()],
        references_table: "files".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      unique_constraints: vec![UniqueConstraint {
        columns: vec!["chunk_uuid".to_string()],
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "vector_index".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("project_id", "TEXT").not_null(),
        ColumnDef::new("entity_type", "TEXT").not_null(),
        ColumnDef::new("entity_id", "INTEGER").not_null(),
        ColumnDef::new("vector_id", "INTEGER").not_null(),
        ColumnDef::new("vector_dim", "INTEGER").not_null(),
        ColumnDef::new("embedding_model", "TEXT").not_null(),
      ],
      unique_constraints: vec![UniqueConstraint {
        columns: vec!["vector_id".to_string()],
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "code_duplicates".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("project_id", "TEXT").not_null(),
        ColumnDef::new("fingerprint", "TEXT").not_null(),
        ColumnDef::new("token_count", "INTEGER").not_null(),
      ],
      unique_constraints: vec![UniqueConstraint {
        columns: vec!["project_id".to_string(), "fingerprint".to_string()],
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "duplicate_occurrences".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("id", "INTEGER").primary_key().autoincrement(),
        ColumnDef::new("duplicate_id", "INTEGER").not_null(),
        ColumnDef::new("file_id", "INTEGER").not_null(),
        ColumnDef::new("start_line", "INTEGER").not_null(),
        ColumnDef::new("end_line", "INTEGER").not_null(),
      ],
      foreign_keys: vec![
        ForeignKey {
          columns: vec!["duplicate_id".to_string()],
          references_table: "code_duplicates".to_string(),
          references_columns: vec!["id".to_string()],
          on_delete: Some("CASCADE".to_string()),
        },
        ForeignKey {
          columns: vec!["file_id".to_string()],
          references_table: "files".to_string(),
          references_columns: vec!["id".to_string()],
          on_delete: Some("CASCADE".to_string()),
        },
      ],
      ..Default::default()
    },
  );

  tables.insert(
    "comprehensive_analysis_results".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("file_id", "INTEGER").primary_key(),
        ColumnDef::new("file_mtime", "REAL").not_null(),
        ColumnDef::new("result", "TEXT").not_null(),
      ],
      foreign_keys: vec![ForeignKey {
        columns: vec!["file_id".to_string()],
        references_table: "files".to_string(),
        references_columns: vec!["id".to_string()],
        on_delete: Some("CASCADE".to_string()),
      }],
      ..Default::default()
    },
  );

  tables.insert(
    "file_watcher_stats".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("cycle_id", "TEXT").primary_key(),
        ColumnDef::new("project_id", "TEXT").not_null(),
        ColumnDef::new("files_scanned", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("files_changed", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("files_deleted", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("started_at", "REAL").not_null(),
        ColumnDef::new("finished_at", "REAL"),
      ],
      ..Default::default()
    },
  );

  tables.insert(
    "vectorization_stats".to_string(),
    Table {
      columns: vec![
        ColumnDef::new("cycle_id", "TEXT").primary_key(),
        ColumnDef::new("project_id", "TEXT").not_null(),
        ColumnDef::new("chunks_embedded", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("chunks_registered", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("embedder_failures", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("index_failures", "INTEGER").not_null().default_value("0"),
        ColumnDef::new("started_at", "REAL").not_null(),
        ColumnDef::new("finished_at", "REAL"),
      ],
      ..Default::default()
    },
  );

  let indexes = vec![
    IndexDef {
      name: "idx_files_project".to_string(),
      table: "files".to_string(),
      columns: vec!["project_id".to_string()],
      unique: false,
      where_clause: None,
    },
    IndexDef {
      name: "idx_classes_file".to_string(),
      table: "classes".to_string(),
      columns: vec!["file_id".to_string()],
      unique: false,
      where_clause: None,
    },
    IndexDef {
      name: "idx_methods_class".to_string(),
      table: "methods".to_string(),
      columns: vec!["class_id".to_string()],
      unique: false,
      where_clause: None,
    },
    IndexDef {
      name: "idx_functions_file".to_string(),
      table: "functions".to_string(),
      columns: vec!["file_id".to_string()],
      unique: false,
      where_clause: None,
    },
    IndexDef {
      name: "idx_usages_file".to_string(),
      table: "usages".to_string(),
      columns: vec!["file_id".to_string()],
      unique: false,
      where_clause: None,
    },
    IndexDef {
      name: "idx_usages_target_name".to_string(),
      table: "usages".to_string(),
      columns: vec!["target_name".to_string()],
      unique: false,
      where_clause: None,
    },
    IndexDef {
      name: "idx_cross_refs_file".to_string(),
      table: "entity_cross_refs".to_string(),
      columns: vec!["file_id".to_string()],
      unique: false,
      where_clause: None,
    },
    IndexDef {
      name: "idx_chunks_file".to_string(),
      table: "code_chunks".to_string(),
      columns: vec!["file_id".to_string()],
      unique: false,
      where_clause: None,
    },
    IndexDef {
      name: "idx_chunks_needs_embedding".to_string(),
      table: "code_chunks".to_string(),
      columns: vec!["embedding_vector".to_string()],
      unique: false,
      where_clause: Some("embedding_vector IS NULL".to_string()),
    },
  ];

  let virtual_tables = vec![VirtualTable {
    name: "code_content_fts".to_string(),
    ty: "fts5".to_string(),
    columns: vec!["content".to_string(), "docstring".to_string()],
    options: {
      let mut opts = BTreeMap::new();
      opts.insert("content".to_string(), "code_content".to_string());
      opts.insert("content_rowid".to_string(), "id".to_string());
      opts
    },
  }];

  Schema {
    version: "1".to_string(),
    tables,
    indexes,
    virtual_tables,
  }
}
