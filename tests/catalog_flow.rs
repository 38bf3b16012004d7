mod common;

use baristaflow_api::{
    dto::{
        blogs::CreateBlogRequest,
        courses::{CourseQuery, CreateCourseRequest, UpdateCourseRequest},
    },
    error::AppError,
    mail::RecordingMailer,
    models::NotificationKind,
    services::{blog_service, course_service, notification_service, user_service},
};
use common::{BrokenCollection, app, app_with, register, register_educator};
use serde_json::json;

fn new_course(title: &str) -> CreateCourseRequest {
    serde_json::from_value(json!({
        "title": title,
        "description": "Vertido y temperatura",
        "price": "34.99",
        "duration": "4 semanas",
        "level": "Intermedio",
    }))
    .expect("course payload")
}

#[tokio::test]
async fn archived_courses_leave_the_catalog_but_stay_reachable() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let educator = register_educator(state, "Marta").await?;

    let kept = course_service::create_course(state, &educator, new_course("V60"))
        .await?
        .data
        .expect("course");
    let archived = course_service::create_course(state, &educator, new_course("Moka"))
        .await?
        .data
        .expect("course");
    course_service::archive_course(state, &educator, &archived.id).await?;

    let public = course_service::list_courses(state, CourseQuery::default())
        .await?
        .data
        .expect("list");
    let ids: Vec<&str> = public.items.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![kept.id.as_str()]);

    let mine = course_service::list_courses(
        state,
        CourseQuery {
            author_id: Some(educator.uid.clone()),
        },
    )
    .await?
    .data
    .expect("list");
    assert_eq!(mine.items.len(), 2);

    let by_id = course_service::get_course(state, &archived.id)
        .await?
        .data
        .expect("course");
    assert!(by_id.is_archived);

    let enrolled = course_service::enrolled_courses(
        state,
        vec![json!(archived.id), json!("missing"), json!(42)],
    )
    .await?
    .data
    .expect("enrolled");
    assert_eq!(enrolled.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn course_gates_follow_role_and_authorship() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let student = register(state, "Pedro").await?;
    let educator = register_educator(state, "Marta").await?;

    let denied = course_service::create_course(state, &student, new_course("V60")).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let untitled = course_service::create_course(state, &educator, new_course("")).await;
    assert!(matches!(untitled, Err(AppError::BadRequest(_))));

    let course = course_service::create_course(state, &educator, new_course("V60"))
        .await?
        .data
        .expect("course");

    let foreign = course_service::update_course(
        state,
        &student,
        &course.id,
        UpdateCourseRequest {
            title: Some("Hijacked".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(foreign, Err(AppError::Forbidden)));

    let updated = course_service::update_course(
        state,
        &educator,
        &course.id,
        UpdateCourseRequest {
            price: Some("29.99".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("course");
    assert_eq!(updated.id, course.id);
    assert_eq!(updated.title, "V60");
    assert_eq!(updated.price, "29.99");
    Ok(())
}

#[tokio::test]
async fn publishing_a_post_notifies_each_follower_once() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let author = register(state, "Andrea").await?;
    let first = register(state, "Benja").await?;
    let second = register(state, "Carla").await?;
    let bystander = register(state, "Diego").await?;

    user_service::follow(state, &first, &author.uid).await?;
    user_service::follow(state, &second, &author.uid).await?;

    let payload: CreateBlogRequest = serde_json::from_value(json!({
        "title": "La magia del tueste",
        "content": "El tueste transforma el grano verde en el cafe aromatico que amamos.",
    }))?;
    let created = blog_service::create_blog(state, &author, payload)
        .await?
        .data
        .expect("blog");
    assert_eq!(created.notified_followers, 2);
    assert_eq!(created.blog.id, 1);
    assert_eq!(created.blog.author, "Andrea");
    assert!(created.blog.excerpt.ends_with("..."));

    for follower in [&first, &second] {
        let inbox = notification_service::inbox(state.store.as_ref(), &follower.uid).await?;
        let posts: Vec<_> = inbox
            .iter()
            .filter(|n| n.kind == NotificationKind::NewPost)
            .collect();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].from_user_id.as_deref(), Some(author.uid.as_str()));
        assert_eq!(posts[0].link.as_deref(), Some("/community/1"));
    }
    assert!(
        notification_service::inbox(state.store.as_ref(), &bystander.uid)
            .await?
            .is_empty()
    );
    Ok(())
}

#[tokio::test]
async fn failed_follower_notifications_do_not_block_publishing() -> anyhow::Result<()> {
    let app = app_with(
        std::sync::Arc::new(BrokenCollection::new("notifications")),
        RecordingMailer::default(),
    );
    let state = &app.state;
    let author = register(state, "Andrea").await?;
    let follower = register(state, "Benja").await?;
    user_service::follow(state, &follower, &author.uid).await?;

    let payload: CreateBlogRequest = serde_json::from_value(json!({
        "title": "Agua y extraccion",
        "content": "La calidad del agua cambia la taza por completo.",
    }))?;
    let created = blog_service::create_blog(state, &author, payload)
        .await?
        .data
        .expect("blog");
    assert_eq!(created.notified_followers, 0);

    let stored = blog_service::get_blog(state, created.blog.id)
        .await?
        .data
        .expect("stored blog");
    assert_eq!(stored.title, "Agua y extraccion");
    Ok(())
}

#[tokio::test]
async fn blog_ids_grow_and_deletes_are_author_only() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let author = register(state, "Andrea").await?;
    let other = register(state, "Benja").await?;

    let post = |title: &str| -> CreateBlogRequest {
        serde_json::from_value(json!({ "title": title, "content": "cuerpo" })).expect("payload")
    };
    blog_service::create_blog(state, &author, post("uno")).await?;
    let second = blog_service::create_blog(state, &author, post("dos"))
        .await?
        .data
        .expect("blog");
    assert_eq!(second.blog.id, 2);

    let denied = blog_service::delete_blog(state, &other, 2).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    blog_service::delete_blog(state, &author, 2).await?;
    let missing = blog_service::get_blog(state, 2).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let list = blog_service::list_blogs(state).await?.data.expect("list");
    assert_eq!(list.items.len(), 1);
    Ok(())
}
