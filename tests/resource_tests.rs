//! CRUD over the shared resource handlers in HTML, JSON and XML

mod common;

use common::{location, TestApp};
use library::models::{Book, Category};
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_category(app: &TestApp, name: &str) -> Value {
    let response = app
        .post_json(
            "/auth/categories",
            &json!({ "category_name": name, "status": 1 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_create_category_requires_fields() {
    let app = TestApp::signed_in().await;

    let response = app.post_json("/auth/categories", &json!({})).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["errors"]["category_name"][0],
        "CategoryName can not be blank."
    );
    assert_eq!(body["errors"]["status"][0], "Status can not be blank.");
    assert_eq!(app.count::<Category>().await, 0);
}

#[tokio::test]
async fn test_create_category_from_html_form() {
    let app = TestApp::signed_in().await;

    let response = app
        .post_form(
            "/auth/categories",
            &[("category_name", "Poetry"), ("status", "1")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let show = location(&response);
    assert!(show.starts_with("/auth/categories/"));

    let page = app.get(&show).await.text().await.unwrap();
    assert!(page.contains("Category was successfully created."));
    assert!(page.contains("Poetry"));
    assert_eq!(app.count::<Category>().await, 1);
}

#[tokio::test]
async fn test_invalid_html_form_rerenders_with_errors() {
    let app = TestApp::signed_in().await;

    let response = app
        .post_form("/auth/categories", &[("category_name", "Poetry")])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = response.text().await.unwrap();
    assert!(page.contains("Status can not be blank."));
    // submitted values survive the round trip
    assert!(page.contains("Poetry"));
}

#[tokio::test]
async fn test_unknown_or_malformed_id_is_not_found() {
    let app = TestApp::signed_in().await;

    let missing = uuid::Uuid::new_v4();
    let response = app.get_json(&format!("/auth/books/{}", missing)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get_json("/auth/books/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get(&format!("/auth/books/{}/edit", missing)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_destroy_twice() {
    let app = TestApp::signed_in().await;
    let category = create_category(&app, "Drama").await;
    let path = format!("/auth/categories/{}", category["id"].as_str().unwrap());

    let response = app.delete_json(&path).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["category_name"], "Drama");

    let response = app.delete_json(&path).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.count::<Category>().await, 0);
}

#[tokio::test]
async fn test_destroy_from_html_redirects_to_index() {
    let app = TestApp::signed_in().await;
    let category = create_category(&app, "Drama").await;
    let path = format!("/auth/categories/{}", category["id"].as_str().unwrap());

    let response = app.post_form(&format!("{}?_method=DELETE", path), &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/categories");

    let page = app.get("/auth/categories").await.text().await.unwrap();
    assert!(page.contains("Category was successfully destroyed."));
}

#[tokio::test]
async fn test_book_json_includes_category() {
    let app = TestApp::signed_in().await;
    let category = create_category(&app, "Fiction").await;

    let response = app
        .post_json(
            "/auth/books",
            &json!({
                "category_id": category["id"],
                "title": "Dune",
                "book_no": "B-1",
                "author": "Frank Herbert",
                "price": "9.99",
                "status": 1,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["title"], "Dune");
    assert_eq!(book["category"]["category_name"], "Fiction");

    let path = format!("/auth/books/{}", book["id"].as_str().unwrap());
    let shown: Value = app.get_json(&path).await.json().await.unwrap();
    assert_eq!(shown["category"]["id"], category["id"]);

    let listed: Value = app.get_json("/auth/books").await.json().await.unwrap();
    assert_eq!(listed[0]["category"]["category_name"], "Fiction");
}

#[tokio::test]
async fn test_update_keeps_fields_not_submitted() {
    let app = TestApp::signed_in().await;
    let category = create_category(&app, "History").await;
    let id = category["id"].as_str().unwrap();

    let response = app
        .post_form(
            &format!("/auth/categories/{}?_method=PUT", id),
            &[("category_name", "World History")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/auth/categories/{}", id));

    let shown: Value = app
        .get_json(&format!("/auth/categories/{}", id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(shown["category_name"], "World History");
    assert_eq!(shown["status"], 1);
    assert_eq!(shown["created_at"], category["created_at"]);
}

#[tokio::test]
async fn test_update_json_validation_failure_is_rolled_back() {
    let app = TestApp::signed_in().await;
    let category = create_category(&app, "History").await;
    let path = format!("/auth/categories/{}", category["id"].as_str().unwrap());

    let response = app.put_json(&path, &json!({ "category_name": "" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let shown: Value = app.get_json(&path).await.json().await.unwrap();
    assert_eq!(shown["category_name"], "History");
}

#[tokio::test]
async fn test_xml_list_and_record() {
    let app = TestApp::signed_in().await;
    let category = create_category(&app, "Science").await;

    let body = app
        .get("/auth/categories?format=xml")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.starts_with("<categories>"), "{}", body);
    assert!(body.contains("<category>"));
    assert!(body.contains("Science"));

    let response = app
        .client
        .get(app.url(&format!(
            "/auth/categories/{}",
            category["id"].as_str().unwrap()
        )))
        .header(ACCEPT, "application/xml")
        .send()
        .await
        .unwrap();
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .contains("xml"));
    assert!(response.text().await.unwrap().starts_with("<category>"));
}

#[tokio::test]
async fn test_xml_validation_errors() {
    let app = TestApp::signed_in().await;
    let response = app
        .client
        .post(app.url("/auth/categories?format=xml"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.starts_with("<errors>"), "{}", body);
    assert!(body.contains("CategoryName can not be blank."));
}

#[tokio::test]
async fn test_pagination_and_index_alias() {
    let app = TestApp::signed_in().await;
    for name in ["A", "B", "C", "D", "E"] {
        create_category(&app, name).await;
    }

    let page: Value = app
        .get_json("/auth/categories?per_page=2&page=2")
        .await
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = page
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["category_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["C", "D"]);

    let last: Value = app
        .get_json("/auth/categories/index?per_page=2&page=3")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(last.as_array().unwrap().len(), 1);

    // garbage parameters fall back to the defaults
    let all: Value = app
        .get_json("/auth/categories?page=abc&per_page=-1")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(all.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_html_pages_render() {
    let app = TestApp::signed_in().await;
    let category = create_category(&app, "Travel").await;
    let id = category["id"].as_str().unwrap();

    for path in [
        "/auth/books".to_string(),
        "/auth/books/new".to_string(),
        "/auth/inventories/new".to_string(),
        "/auth/customers".to_string(),
        "/auth/users".to_string(),
        format!("/auth/categories/{}/edit", id),
    ] {
        let response = app.get(&path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", path);
    }

    // the book form offers existing categories
    let page = app.get("/auth/books/new").await.text().await.unwrap();
    assert!(page.contains("Travel"));
}

#[tokio::test]
async fn test_book_cover_upload() {
    let app = TestApp::signed_in().await;
    let category = create_category(&app, "Art").await;

    let form = Form::new()
        .text("category_id", category["id"].as_str().unwrap().to_string())
        .text("title", "Ways of Seeing")
        .text("book_no", "B-7")
        .text("author", "John Berger")
        .text("price", "12.00")
        .text("status", "1")
        .part(
            "picture",
            Part::bytes(b"\x89PNG cover".to_vec())
                .file_name("Cover.PNG")
                .mime_str("image/png")
                .unwrap(),
        );
    let response = app
        .client
        .post(app.url("/auth/books"))
        .header(ACCEPT, "application/json")
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let book: Value = response.json().await.unwrap();
    assert_eq!(
        book["picture_path"],
        "/uploads/books/6ba7b810-9dad-11d1-80b4-00c04fd430c8.png"
    );
    assert!(app
        .upload_root()
        .join("books/6ba7b810-9dad-11d1-80b4-00c04fd430c8.png")
        .exists());

    let response = app
        .get("/uploads/books/6ba7b810-9dad-11d1-80b4-00c04fd430c8.png")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(&response.bytes().await.unwrap()[..], b"\x89PNG cover");

    // uploads are behind the login
    let anonymous = app.other_client();
    let response = anonymous
        .get(app.url("/uploads/books/6ba7b810-9dad-11d1-80b4-00c04fd430c8.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_bad_integer_is_bad_request() {
    let app = TestApp::signed_in().await;
    let response = app
        .post_form(
            "/auth/categories",
            &[("category_name", "Maps"), ("status", "active")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.count::<Category>().await, 0);
}

#[tokio::test]
async fn test_inventory_loads_its_book() {
    let app = TestApp::signed_in().await;
    let category = create_category(&app, "Reference").await;
    let book: Value = app
        .post_json(
            "/auth/books",
            &json!({
                "category_id": category["id"],
                "title": "Atlas",
                "book_no": "R-1",
                "author": "Various",
                "price": "30",
            }),
        )
        .await
        .json()
        .await
        .unwrap();

    let response = app
        .post_json(
            "/auth/inventories",
            &json!({ "book_id": book["id"], "qty": 3 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let inventory: Value = response.json().await.unwrap();
    assert_eq!(inventory["qty"], 3);
    assert_eq!(inventory["book"]["title"], "Atlas");

    let response = app.post_json("/auth/inventories", &json!({ "qty": 1 })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.count::<Book>().await, 1);
}

#[tokio::test]
async fn test_customer_crud() {
    let app = TestApp::signed_in().await;

    let response = app.post_json("/auth/customers", &json!({ "name": "Ada" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"]["email"].is_array());

    let response = app
        .post_json(
            "/auth/customers",
            &json!({ "name": "Ada", "email": "ada@example.com", "mobile": "555" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let customer: Value = response.json().await.unwrap();

    let path = format!("/auth/customers/{}", customer["id"].as_str().unwrap());
    let response = app.put_json(&path, &json!({ "mobile": "556" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["mobile"], "556");
    assert_eq!(updated["email"], "ada@example.com");
}

#[tokio::test]
async fn test_large_cover_upload_is_accepted() {
    let app = TestApp::signed_in().await;
    let category = create_category(&app, "Photography").await;
    let cover = vec![0u8; 3 * 1024 * 1024];

    let form = Form::new()
        .text("category_id", category["id"].as_str().unwrap().to_string())
        .text("title", "On Photography")
        .text("book_no", "P-1")
        .text("author", "Susan Sontag")
        .text("price", "15")
        .part(
            "picture",
            Part::bytes(cover.clone())
                .file_name("cover.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        );
    let response = app
        .client
        .post(app.url("/auth/books?format=json"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let stored = app
        .upload_root()
        .join("books/6ba7b810-9dad-11d1-80b4-00c04fd430c8.jpg");
    assert_eq!(std::fs::metadata(stored).unwrap().len(), cover.len() as u64);
}

#[tokio::test]
async fn test_body_over_configured_limit_is_rejected() {
    let app = TestApp::spawn_with(|config| config.server.max_upload_bytes = 1024).await;
    app.create_user(common::EMAIL, common::PASSWORD).await;
    app.login(common::EMAIL, common::PASSWORD).await;

    let form = Form::new().text("title", "Too big").part(
        "picture",
        Part::bytes(vec![0u8; 4096]).file_name("cover.png"),
    );
    let response = app
        .client
        .post(app.url("/auth/books?format=json"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert_eq!(app.count::<Book>().await, 0);
}
