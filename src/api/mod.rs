use rocket::Route;

mod auth;
mod elections;
mod users;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(elections::routes());
    routes.extend(voting::routes());
    routes.extend(users::routes());
    routes
}
