use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        blocks::{BlockEdit, BlockWire},
        cart::CartItem,
        search::{SearchCounts, SearchOutcome, SearchResult},
    },
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        blogs::{BlogList, CreateBlogRequest, CreatedBlog, UpdateBlogRequest},
        content::{BlockEditsRequest, EditedBlocks, RenderedDocument},
        courses::{CourseList, CreateCourseRequest, EnrolledCoursesRequest, UpdateCourseRequest},
        forms::{
            Acknowledgement, ContactRequest, EducatorApplication, EducatorApplyRequest,
            UploadedFile,
        },
        orders::{CreateOrderRequest, OrderData, OrderList},
        products::ProductList,
        recipes::RecipeList,
        users::{FollowState, NotificationList, UpdatedCount},
    },
    models::{
        BlogPost, Course, CustomerFields, Difficulty, Notification, Order, Product, PublicProfile,
        Recipe, Role, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, blogs, courses, forms, health, notifications, orders, products, recipes, search,
        users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::current,
        products::list_products,
        products::get_product,
        recipes::list_recipes,
        recipes::get_recipe,
        courses::list_courses,
        courses::create_course,
        courses::get_course,
        courses::update_course,
        courses::archive_course,
        courses::enrolled_courses,
        courses::edit_blocks,
        courses::render_course,
        blogs::list_blogs,
        blogs::create_blog,
        blogs::get_blog,
        blogs::update_blog,
        blogs::delete_blog,
        blogs::edit_blocks,
        blogs::render_blog,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        users::get_profile,
        users::follow,
        users::unfollow,
        notifications::list_notifications,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::clear_notifications,
        notifications::unread_stream,
        forms::contact,
        forms::educator_apply,
        forms::upload,
        search::search
    ),
    components(
        schemas(
            User,
            Role,
            PublicProfile,
            Product,
            Recipe,
            Difficulty,
            Course,
            BlogPost,
            Order,
            CustomerFields,
            CartItem,
            Notification,
            BlockWire,
            BlockEdit,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateCourseRequest,
            UpdateCourseRequest,
            EnrolledCoursesRequest,
            CourseList,
            CreateBlogRequest,
            UpdateBlogRequest,
            CreatedBlog,
            BlogList,
            BlockEditsRequest,
            EditedBlocks,
            RenderedDocument,
            CreateOrderRequest,
            OrderData,
            OrderList,
            FollowState,
            NotificationList,
            UpdatedCount,
            ContactRequest,
            EducatorApplyRequest,
            EducatorApplication,
            UploadedFile,
            Acknowledgement,
            SearchOutcome,
            SearchResult,
            SearchCounts,
            ProductList,
            RecipeList,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Recipe>,
            ApiResponse<RecipeList>,
            ApiResponse<Course>,
            ApiResponse<CourseList>,
            ApiResponse<BlogPost>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<SearchOutcome>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Recipes", description = "Brewing recipe endpoints"),
        (name = "Courses", description = "Course endpoints"),
        (name = "Blogs", description = "Community blog endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Users", description = "Profile and follow endpoints"),
        (name = "Notifications", description = "Notification endpoints"),
        (name = "Forms", description = "Contact, educator application and upload endpoints"),
        (name = "Search", description = "Aggregate search endpoint"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
