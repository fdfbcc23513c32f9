//! The session controller.
//!
//! A [`Session`] owns the open engine, the current table and the result
//! grid, and turns each user action into SQL for the engine. Every action
//! reports its own outcome through the [`View`]: failures never escape an
//! action, so the session stays usable after any of them.

use crate::core::db::{format_value, ColumnInfo, ConnectOptions, Outcome, Value};
use crate::core::{EditorError, Result};
use crate::engine::Engine;
use crate::results_grid::{GridSource, ResultsGrid};
use crate::sql::{self, FieldDef, RebuildPlan};
use crate::view::{Level, View};
use std::path::Path;
use tracing::{debug, info, warn};

const TYPE_HINT: &str = "TEXT, INTEGER, REAL, etc.";

pub struct Session<E: Engine, V: View> {
    engine: Option<E>,
    view: V,
    options: ConnectOptions,
    current_table: Option<String>,
    tables: Vec<String>,
    results: ResultsGrid,
}

impl<E: Engine, V: View> Session<E, V> {
    /// Creates a session with no database open.
    pub fn new(view: V, options: ConnectOptions) -> Self {
        Session {
            engine: None,
            view,
            options,
            current_table: None,
            tables: Vec::new(),
            results: ResultsGrid::new(),
        }
    }

    /// Creates a session over an engine that is already open.
    pub fn with_engine(engine: E, view: V, options: ConnectOptions) -> Self {
        let mut session = Session::new(view, options);
        session.engine = Some(engine);
        session
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.engine.is_some()
    }

    pub fn current_table(&self) -> Option<&str> {
        self.current_table.as_deref()
    }

    /// Table names as last listed.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn results(&self) -> &ResultsGrid {
        &self.results
    }

    /// Opens the database at `path`, replacing the current one.
    ///
    /// The new file is validated before anything is replaced: on failure the
    /// previous connection, table list, selection and results are kept.
    pub fn open_database(&mut self, path: &Path) {
        let result = self.try_open_database(path);
        self.report("Could not open the database", result);
    }

    /// Re-reads the table list from the catalog and publishes it.
    pub fn list_tables(&mut self) -> Vec<String> {
        let result = self.refresh_tables().map(|_| None);
        self.report("Could not list tables", result);
        self.tables.clone()
    }

    /// Makes `name` the current table and shows its contents.
    pub fn select_table(&mut self, name: &str) {
        let result = self.try_select_table(name);
        self.report("Could not select the table", result);
    }

    /// Shows every row of the current table.
    pub fn view_content(&mut self) {
        let result = self.load_content().map(|_| None);
        self.report("Could not load the table contents", result);
    }

    /// Prompts for a table name and its fields, then creates the table.
    pub fn create_table(&mut self) {
        let result = self.try_create_table();
        self.report("Could not create the table", result);
    }

    /// Drops the current table after confirmation.
    pub fn delete_table(&mut self) {
        let result = self.try_delete_table();
        self.report("Could not delete the table", result);
    }

    /// Runs statement text typed by the user.
    ///
    /// Statements returning rows replace the result grid. Anything else is
    /// treated as a change: it is committed and the table list refreshed.
    pub fn execute_query(&mut self, text: &str) {
        let result = self.try_execute_query(text);
        self.report("Error executing the query", result);
    }

    /// Prompts for one value per column and inserts the record.
    pub fn add_record(&mut self) {
        let result = self.try_add_record();
        self.report("Could not add the record", result);
    }

    /// Edits the record at grid row `selected` (0-based).
    ///
    /// The record is located by the values of all of its columns, not by a
    /// key. When other rows hold identical values, they are updated too;
    /// the notice reports how many rows changed.
    pub fn edit_record(&mut self, selected: Option<usize>) {
        let result = self.try_edit_record(selected);
        self.report("Could not update the record", result);
    }

    /// Deletes the record at grid row `selected` after confirmation.
    ///
    /// Like [`Session::edit_record`], every row identical to the selected
    /// one is deleted.
    pub fn delete_record(&mut self, selected: Option<usize>) {
        let result = self.try_delete_record(selected);
        self.report("Could not delete the record", result);
    }

    /// Adds, removes, or renames/retypes a field of the current table.
    pub fn modify_fields(&mut self) {
        let result = self.try_modify_fields();
        self.report("Could not modify the fields", result);
    }

    fn report(&mut self, context: &str, result: Result<Option<String>>) {
        match result {
            Ok(Some(message)) => {
                info!("{}", message);
                self.view.notify(Level::Info, &message);
            }
            Ok(None) => {}
            Err(err) if err.is_user_error() => {
                debug!(error = %err, "rejected input");
                self.view.notify(Level::Warning, &err.to_string());
            }
            Err(err) => {
                warn!(error = %err, "{}", context);
                self.view
                    .notify(Level::Error, &format!("{}: {}", context, err));
            }
        }
    }

    fn engine_ref(&self) -> Result<&E> {
        self.engine.as_ref().ok_or(EditorError::NotConnected)
    }

    fn engine_mut(&mut self) -> Result<&mut E> {
        self.engine.as_mut().ok_or(EditorError::NotConnected)
    }

    fn require_table(&self) -> Result<String> {
        self.engine_ref()?;
        self.current_table
            .clone()
            .ok_or(EditorError::NoTableSelected)
    }

    /// Prompts and trims; an empty answer counts as no answer.
    fn ask(&mut self, title: &str, message: &str, initial: Option<&str>) -> Option<String> {
        self.view
            .prompt(title, message, initial)
            .map(|answer| answer.trim().to_string())
            .filter(|answer| !answer.is_empty())
    }

    fn refresh_tables(&mut self) -> Result<()> {
        self.tables = self.engine_ref()?.list_tables()?;
        self.view.show_tables(&self.tables);
        Ok(())
    }

    fn load_content(&mut self) -> Result<()> {
        let table = self.require_table()?;
        let result = self.engine_mut()?.query(&sql::select_all(&table), &[])?;
        debug!(table = %table, rows = result.row_count, "loaded table contents");
        self.results = ResultsGrid::from_result(result, GridSource::Table(table));
        self.view.show_results(&self.results);
        Ok(())
    }

    fn clear_results(&mut self) {
        self.results.clear();
        self.view.clear_results();
    }

    fn try_open_database(&mut self, path: &Path) -> Result<Option<String>> {
        let engine = E::open(path, &self.options)?;
        let tables = engine.list_tables()?;

        self.engine = Some(engine);
        self.current_table = None;
        self.clear_results();
        self.tables = tables;
        self.view.show_tables(&self.tables);
        info!(path = %path.display(), tables = self.tables.len(), "database opened");
        Ok(None)
    }

    fn try_select_table(&mut self, name: &str) -> Result<Option<String>> {
        self.refresh_tables()?;
        if !self.tables.iter().any(|t| t == name) {
            return Err(EditorError::Input(format!("No table named '{}'", name)));
        }
        self.current_table = Some(name.to_string());
        self.load_content()?;
        Ok(None)
    }

    fn try_create_table(&mut self) -> Result<Option<String>> {
        self.engine_ref()?;
        let name = self
            .ask("Create table", "Name of the new table:", None)
            .ok_or_else(|| EditorError::Input("A table name is required".to_string()))?;

        let mut fields = Vec::new();
        while let Some(field) = self.ask(
            "Add field",
            "Field name (leave empty to finish):",
            None,
        ) {
            let field_type = self
                .ask(
                    "Field type",
                    &format!("Type of '{}' ({}):", field, TYPE_HINT),
                    None,
                )
                .unwrap_or_default();
            fields.push(FieldDef::new(&field, &field_type));
        }

        let statement = sql::create_table(&name, &fields)?;
        let engine = self.engine_mut()?;
        engine.execute(&statement, &[])?;
        engine.commit()?;
        self.refresh_tables()?;
        Ok(Some(format!("Table '{}' created", name)))
    }

    fn try_delete_table(&mut self) -> Result<Option<String>> {
        let table = self.require_table()?;
        let question = format!("Are you sure you want to delete the table '{}'?", table);
        if !self.view.confirm("Confirm", &question) {
            return Ok(None);
        }

        let engine = self.engine_mut()?;
        engine.execute(&sql::drop_table(&table), &[])?;
        engine.commit()?;
        // The table is gone even if the list cannot be re-read
        self.current_table = None;
        self.clear_results();
        self.refresh_tables()?;
        Ok(Some(format!("Table '{}' deleted", table)))
    }

    fn try_execute_query(&mut self, text: &str) -> Result<Option<String>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EditorError::Input("Please enter a SQL query".to_string()));
        }

        match self.engine_mut()?.run(text)? {
            Outcome::Rows(result) => {
                self.results = ResultsGrid::from_result(result, GridSource::Query(text.to_string()));
                self.view.show_results(&self.results);
                Ok(None)
            }
            Outcome::Changed(changed) => {
                self.engine_mut()?.commit()?;
                self.refresh_tables()?;
                Ok(Some(format!(
                    "Query executed successfully ({} affected)",
                    rows(changed)
                )))
            }
        }
    }

    fn try_add_record(&mut self) -> Result<Option<String>> {
        let table = self.require_table()?;
        let columns = self.engine_ref()?.columns(&table)?;

        let mut values = Vec::with_capacity(columns.len());
        for column in &columns {
            let message = format!("Value for {}:", describe(column));
            let answer = self.view.prompt("Add record", &message, None);
            values.push(answer.map(Value::Text).unwrap_or(Value::Null));
        }

        let names = names(&columns);
        let engine = self.engine_mut()?;
        engine.execute(&sql::insert(&table, &names), &values)?;
        engine.commit()?;
        self.load_content()?;
        Ok(Some("Record added".to_string()))
    }

    /// Returns the table, its columns and the raw values of grid row
    /// `selected`, checking that the grid still matches the table.
    fn selected_record(
        &self,
        selected: Option<usize>,
    ) -> Result<(String, Vec<ColumnInfo>, Vec<Value>)> {
        let table = self.require_table()?;
        let index = selected.ok_or(EditorError::NoRowSelected)?;
        if !self.results.shows_table(&table) {
            return Err(EditorError::Input(format!(
                "Show the contents of '{}' before changing its records",
                table
            )));
        }
        let original = self
            .results
            .row(index)
            .ok_or(EditorError::NoRowSelected)?
            .to_vec();

        let columns = self.engine_ref()?.columns(&table)?;
        let same_layout = columns.len() == self.results.headers.len()
            && columns
                .iter()
                .zip(&self.results.headers)
                .all(|(c, h)| &c.name == h);
        if !same_layout {
            return Err(EditorError::Schema(format!(
                "the fields of '{}' changed since it was displayed; view it again",
                table
            )));
        }
        Ok((table, columns, original))
    }

    fn try_edit_record(&mut self, selected: Option<usize>) -> Result<Option<String>> {
        let (table, columns, original) = self.selected_record(selected)?;

        let mut values = Vec::with_capacity(columns.len());
        for (column, current) in columns.iter().zip(&original) {
            let shown = format_value(current);
            let message = format!("New value for {}:", describe(column));
            let value = match self.view.prompt("Edit record", &message, Some(&shown)) {
                Some(answer) if answer == shown => current.clone(),
                Some(answer) => Value::Text(answer),
                None => Value::Null,
            };
            values.push(value);
        }
        values.extend(original);

        let names = names(&columns);
        let engine = self.engine_mut()?;
        let changed = engine.execute(&sql::update_matching(&table, &names), &values)?;
        engine.commit()?;
        self.load_content()?;
        Ok(Some(format!("Record updated ({} affected)", rows(changed))))
    }

    fn try_delete_record(&mut self, selected: Option<usize>) -> Result<Option<String>> {
        let (table, columns, original) = self.selected_record(selected)?;
        if !self
            .view
            .confirm("Confirm", "Are you sure you want to delete this record?")
        {
            return Ok(None);
        }

        let names = names(&columns);
        let engine = self.engine_mut()?;
        let changed = engine.execute(&sql::delete_matching(&table, &names), &original)?;
        engine.commit()?;
        self.load_content()?;
        Ok(Some(format!("Record deleted ({} affected)", rows(changed))))
    }

    fn try_modify_fields(&mut self) -> Result<Option<String>> {
        let table = self.require_table()?;
        let columns = self.engine_ref()?.columns(&table)?;

        let choice = self.ask(
            "Modify fields",
            "Choose an option:\n1. Add field\n2. Remove field\n3. Modify field",
            None,
        );
        match choice.as_deref() {
            Some("1") => self.add_field(&table),
            Some("2") => self.remove_field(&table, &columns),
            Some("3") => self.alter_field(&table, &columns),
            _ => Err(EditorError::Input("Invalid option".to_string())),
        }
    }

    fn add_field(&mut self, table: &str) -> Result<Option<String>> {
        let name = self
            .ask("Add field", "Name of the new field:", None)
            .ok_or_else(|| EditorError::Input("A field name is required".to_string()))?;
        let field_type = self
            .ask("Field type", &format!("Field type ({}):", TYPE_HINT), None)
            .unwrap_or_default();
        let field = FieldDef::new(&name, &field_type);

        let engine = self.engine_mut()?;
        engine.execute(&sql::add_column(table, &field), &[])?;
        engine.commit()?;
        self.load_content()?;
        Ok(Some(format!("Field '{}' added", field.name)))
    }

    /// Asks which existing field to work on.
    fn choose_field(&mut self, title: &str, columns: &[ColumnInfo]) -> Result<String> {
        let listing = names(columns).join("\n");
        let field = self
            .ask(title, &format!("Choose the field:\n{}", listing), None)
            .unwrap_or_default();
        if columns.iter().any(|c| c.name == field) {
            Ok(field)
        } else {
            Err(EditorError::Input("Invalid field".to_string()))
        }
    }

    fn remove_field(&mut self, table: &str, columns: &[ColumnInfo]) -> Result<Option<String>> {
        let field = self.choose_field("Remove field", columns)?;
        if columns.len() == 1 {
            return Err(EditorError::Input(format!(
                "'{}' is the only field of '{}' and cannot be removed",
                field, table
            )));
        }

        let plan = sql::rebuild_table(table, &sql::without_column(columns, &field))?;
        self.apply_rebuild(table, plan)?;
        Ok(Some(format!("Field '{}' removed", field)))
    }

    fn alter_field(&mut self, table: &str, columns: &[ColumnInfo]) -> Result<Option<String>> {
        let field = self.choose_field("Modify field", columns)?;
        let current_type = columns
            .iter()
            .find(|c| c.name == field)
            .map(|c| c.type_name.clone())
            .unwrap_or_default();

        let new_name = self
            .ask(
                "New name",
                &format!("New name for the field '{}':", field),
                Some(&field),
            )
            .unwrap_or_else(|| field.clone());
        let new_type = self
            .ask(
                "New type",
                &format!("New type for the field '{}' ({}):", field, TYPE_HINT),
                Some(&current_type),
            )
            .unwrap_or(current_type);

        let plan = sql::rebuild_table(
            table,
            &sql::with_altered_column(columns, &field, &new_name, &new_type),
        )?;
        self.apply_rebuild(table, plan)?;
        Ok(Some(format!("Field '{}' modified", field)))
    }

    /// Runs a reconstruction as one transaction, then shows the result.
    fn apply_rebuild(&mut self, table: &str, plan: RebuildPlan) -> Result<()> {
        debug!(table, shadow = %plan.shadow, "rebuilding table");
        self.engine_mut()?.execute_atomic(&plan.statements)?;
        self.load_content()
    }
}

fn names(columns: &[ColumnInfo]) -> Vec<&str> {
    columns.iter().map(|c| c.name.as_str()).collect()
}

fn describe(column: &ColumnInfo) -> String {
    if column.type_name.is_empty() {
        column.name.clone()
    } else {
        format!("{} ({})", column.name, column.type_name)
    }
}

fn rows(n: usize) -> String {
    match n {
        1 => "1 row".to_string(),
        n => format!("{} rows", n),
    }
}
