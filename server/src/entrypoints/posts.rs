use aura_server::{
    auth::{AuthError, AuthUser},
    db::DB,
    error::{ApiError, ApiResult},
    types::{non_blank, NewPostRequest, PostResponse},
};
use rocket::{fairing::AdHoc, http::Status, response::status::Custom, serde::json::Json, State};

#[utoipa::path(context_path = "/api/posts", request_body = NewPostRequest, responses(
    (status = 201, description = "Post created", body = PostResponse),
    (status = 400, description = "Empty content"),
    (status = 401, description = "Not authenticated")
))]
#[post("/", data = "<request>")]
pub async fn create_post(
    user: Result<AuthUser, AuthError>,
    request: Json<NewPostRequest>,
    db: &State<DB>,
) -> ApiResult<Custom<Json<PostResponse>>> {
    let AuthUser(author) = user?;
    let Some(content) = non_blank(request.content.as_deref()) else {
        return Err(ApiError::bad_request("Post content is required"));
    };

    let post = db
        .create_post(author.id, content)
        .await
        .map_err(|e| ApiError::internal("Failed to create post", e))?;

    Ok(Custom(Status::Created, Json(post.into())))
}

#[utoipa::path(context_path = "/api/posts", responses(
    (status = 200, description = "All posts, newest first", body = [PostResponse])
))]
#[get("/")]
pub async fn get_posts(db: &State<DB>) -> ApiResult<Json<Vec<PostResponse>>> {
    let posts = db
        .get_posts()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch posts", e))?;

    Ok(Json(posts.into_iter().map(Into::into).collect()))
}

#[utoipa::path(context_path = "/api/posts", responses(
    (status = 200, description = "Post with the updated likes", body = PostResponse),
    (status = 401, description = "Not authenticated"),
    (status = 404, description = "Post not found")
))]
#[put("/<id>/like")]
pub async fn toggle_like(
    id: i32,
    user: Result<AuthUser, AuthError>,
    db: &State<DB>,
) -> ApiResult<Json<PostResponse>> {
    let AuthUser(user) = user?;

    match db.toggle_like(id, user.id).await {
        Ok(Some(post)) => Ok(Json(post.into())),
        Ok(None) => Err(ApiError::not_found("Post not found")),
        Err(e) => Err(ApiError::internal(&format!("Failed to toggle like on {id}"), e)),
    }
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing post entrypoints", |rocket| async {
        rocket.mount("/api/posts", routes![create_post, get_posts, toggle_like])
    })
}
