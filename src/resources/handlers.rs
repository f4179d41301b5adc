//! List/Show/New/Create/Edit/Update/Destroy for any [`Resource`]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use minijinja::{context, Value};
use uuid::Uuid;

use super::{save, Action, Resource, SaveContext};
use crate::api::form::FormData;
use crate::api::negotiate::Format;
use crate::api::respond::{self, see_other};
use crate::api::server::SharedState;
use crate::api::transaction::TxHandle;
use crate::api::view::View;
use crate::db::{PageParams, Pagination, Tx};
use crate::error::{Error, Result};
use crate::models::{Errors, Op};

pub fn resource_routes<R: Resource>() -> Router<SharedState> {
    let base = R::index_path();
    Router::new()
        .route(&base, get(list::<R>).post(create::<R>))
        .route(&format!("{}/index", base), get(list::<R>))
        .route(&format!("{}/new", base), get(new::<R>))
        .route(
            &format!("{}/{{id}}", base),
            get(show::<R>)
                .put(update::<R>)
                .patch(update::<R>)
                .delete(destroy::<R>),
        )
        .route(&format!("{}/{{id}}/edit", base), get(edit::<R>))
}

async fn find_or_404<R: Resource>(tx: &mut Tx, id: &str) -> Result<R> {
    let not_found = || Error::NotFound(R::LABEL.to_string());
    let id = Uuid::parse_str(id).map_err(|_| not_found())?;
    tx.find(id).await?.ok_or_else(not_found)
}

fn template<R: Resource>(page: &str) -> String {
    format!("{}/{}.html", R::PLURAL, page)
}

async fn list<R: Resource>(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
    format: Format,
    tx: TxHandle,
    view: View,
) -> Result<Response> {
    let (records, pagination) = {
        let mut tx = tx.lock().await?;
        let total = tx.count::<R>().await?;
        let pagination =
            Pagination::from_params(&params, state.config.pagination.per_page).with_total(total);
        let mut records: Vec<R> = tx.page(&pagination).await?;
        for record in &mut records {
            record.load_associations(&mut tx).await?;
        }
        (records, pagination)
    };

    match format {
        Format::Html => {
            view.render(
                &template::<R>("index"),
                context! { resource => R::info(), records => records, pagination => pagination },
                StatusCode::OK,
            )
            .await
        }
        Format::Json => Ok(respond::json(StatusCode::OK, &records)),
        Format::Xml => respond::xml_list(StatusCode::OK, R::PLURAL, R::SINGULAR, &records),
    }
}

async fn show<R: Resource>(
    Path(id): Path<String>,
    format: Format,
    tx: TxHandle,
    view: View,
) -> Result<Response> {
    let record = {
        let mut tx = tx.lock().await?;
        let mut record: R = find_or_404(&mut tx, &id).await?;
        record.load_associations(&mut tx).await?;
        record
    };

    match format {
        Format::Html => {
            view.render(
                &template::<R>("show"),
                context! { resource => R::info(), record => record },
                StatusCode::OK,
            )
            .await
        }
        Format::Json => Ok(respond::json(StatusCode::OK, &record)),
        Format::Xml => respond::xml(StatusCode::OK, R::SINGULAR, &record),
    }
}

async fn new<R: Resource>(tx: TxHandle, view: View) -> Result<Response> {
    let options = {
        let mut tx = tx.lock().await?;
        R::form_options(&mut tx).await?
    };
    render_form::<R>(&view, "new", R::default(), &Errors::new(), options, StatusCode::OK).await
}

async fn edit<R: Resource>(Path(id): Path<String>, tx: TxHandle, view: View) -> Result<Response> {
    let (record, options) = {
        let mut tx = tx.lock().await?;
        let record: R = find_or_404(&mut tx, &id).await?;
        (record, R::form_options(&mut tx).await?)
    };
    render_form::<R>(&view, "edit", record, &Errors::new(), options, StatusCode::OK).await
}

async fn create<R: Resource>(
    State(state): State<SharedState>,
    format: Format,
    tx: TxHandle,
    view: View,
    form: FormData,
) -> Result<Response> {
    let mut record = R::default();
    record.bind(&form)?;
    let ctx = SaveContext {
        op: Op::Create,
        form: &form,
        uploads: &state.uploads,
        auth: &state.config.auth,
    };

    let mut guard = tx.lock().await?;
    let errors = save(&mut guard, &mut record, &ctx).await?;
    if errors.has_any() {
        let options = R::form_options(&mut guard).await?;
        drop(guard);
        return invalid::<R>(format, &view, "new", record, errors, options).await;
    }
    record.load_associations(&mut guard).await?;
    drop(guard);
    tracing::info!(resource = R::PLURAL, id = %record.id(), "Created");

    match format {
        Format::Html => {
            view.flash("success", &R::flash_message(Action::Created)).await?;
            Ok(see_other(&record.saved_location()))
        }
        Format::Json => Ok(respond::json(StatusCode::CREATED, &record)),
        Format::Xml => respond::xml(StatusCode::CREATED, R::SINGULAR, &record),
    }
}

async fn update<R: Resource>(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    format: Format,
    tx: TxHandle,
    view: View,
    form: FormData,
) -> Result<Response> {
    let mut guard = tx.lock().await?;
    let mut record: R = find_or_404(&mut guard, &id).await?;
    record.bind(&form)?;
    let ctx = SaveContext {
        op: Op::Update,
        form: &form,
        uploads: &state.uploads,
        auth: &state.config.auth,
    };

    let errors = save(&mut guard, &mut record, &ctx).await?;
    if errors.has_any() {
        let options = R::form_options(&mut guard).await?;
        drop(guard);
        return invalid::<R>(format, &view, "edit", record, errors, options).await;
    }
    record.load_associations(&mut guard).await?;
    drop(guard);
    tracing::info!(resource = R::PLURAL, id = %record.id(), "Updated");

    match format {
        Format::Html => {
            view.flash("success", &R::flash_message(Action::Updated)).await?;
            Ok(see_other(&record.saved_location()))
        }
        Format::Json => Ok(respond::json(StatusCode::OK, &record)),
        Format::Xml => respond::xml(StatusCode::OK, R::SINGULAR, &record),
    }
}

async fn destroy<R: Resource>(
    Path(id): Path<String>,
    format: Format,
    tx: TxHandle,
    view: View,
) -> Result<Response> {
    let record = {
        let mut tx = tx.lock().await?;
        let record: R = find_or_404(&mut tx, &id).await?;
        if !tx.destroy::<R>(record.id()).await? {
            return Err(Error::NotFound(R::LABEL.to_string()));
        }
        record
    };
    tracing::info!(resource = R::PLURAL, id = %record.id(), "Destroyed");

    match format {
        Format::Html => {
            view.flash("success", &R::flash_message(Action::Destroyed)).await?;
            Ok(see_other(&R::index_path()))
        }
        Format::Json => Ok(respond::json(StatusCode::OK, &record)),
        Format::Xml => respond::xml(StatusCode::OK, R::SINGULAR, &record),
    }
}

/// 422 in the negotiated format
async fn invalid<R: Resource>(
    format: Format,
    view: &View,
    page: &str,
    record: R,
    errors: Errors,
    options: Value,
) -> Result<Response> {
    match format {
        Format::Html => {
            render_form::<R>(view, page, record, &errors, options, StatusCode::UNPROCESSABLE_ENTITY)
                .await
        }
        Format::Json => Ok(respond::validation_json(&errors)),
        Format::Xml => respond::validation_xml(&errors),
    }
}

async fn render_form<R: Resource>(
    view: &View,
    page: &str,
    record: R,
    errors: &Errors,
    options: Value,
    status: StatusCode,
) -> Result<Response> {
    view.render(
        &format!("resource/{}.html", page),
        context! {
            resource => R::info(),
            form_template => template::<R>("_form"),
            record => record,
            errors => errors.fields(),
            options => options,
        },
        status,
    )
    .await
}
