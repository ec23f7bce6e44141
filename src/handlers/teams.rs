use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Path},
};

use crate::AppState;
use crate::access::{AccessContext, AccessRequirement};
use crate::database::models::{
    AddTeamMemberInput, CreateTeamInput, SubscriptionType, Team, TeamMembership, TeamRole,
    TeamWithMembers, UpdateTeamInput, UpdateTeamMemberInput,
};
use crate::database::is_unique_violation;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

async fn load_team(state: &AppState, team_id: i64) -> Result<Team, AppError> {
    state
        .team_repository
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".to_string()))
}

async fn caller_membership(
    state: &AppState,
    ctx: &AccessContext,
    team_id: i64,
) -> Result<Option<TeamMembership>, AppError> {
    Ok(state
        .team_repository
        .get_membership(team_id, ctx.user_id())
        .await?)
}

async fn require_member(
    state: &AppState,
    ctx: &AccessContext,
    team_id: i64,
) -> Result<Option<TeamMembership>, AppError> {
    let membership = caller_membership(state, ctx, team_id).await?;
    if membership.is_none() && !ctx.is_superadmin() {
        return Err(AppError::Forbidden(
            "You are not a member of this team".to_string(),
        ));
    }
    Ok(membership)
}

async fn require_manager(
    state: &AppState,
    ctx: &AccessContext,
    team_id: i64,
) -> Result<Option<TeamMembership>, AppError> {
    let membership = caller_membership(state, ctx, team_id).await?;
    let can_manage = membership
        .as_ref()
        .is_some_and(|m| m.role.can_manage_team());

    if !can_manage && !ctx.is_superadmin() {
        return Err(AppError::Forbidden(
            "Team owner or admin access required".to_string(),
        ));
    }
    Ok(membership)
}

fn validate_team_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Team name is required".to_string()));
    }
    Ok(())
}

pub async fn create_team(
    ctx: AccessContext,
    state: Data<AppState>,
    input: Json<CreateTeamInput>,
) -> Result<HttpResponse> {
    validate_team_name(&input.name)?;

    let mut input = input.into_inner();
    if input.subscription_type != SubscriptionType::Free && !ctx.is_superadmin() {
        return Err(AppError::Forbidden("Plan changes require an administrator".to_string()).into());
    }
    input.name = input.name.trim().to_string();

    let team = state
        .team_repository
        .create_team_with_owner(&input, &ctx.identity)
        .await
        .map_err(|e| {
            log::error!("Failed to create team for {}: {}", ctx.user_id(), e);
            AppError::DatabaseError(e)
        })?;

    log::info!("User {} created team {}", ctx.user_id(), team.id);
    Ok(ApiResponse::created(team))
}

pub async fn list_teams(ctx: AccessContext, state: Data<AppState>) -> Result<HttpResponse> {
    ctx.require(AccessRequirement::none().admin())?;

    let teams = state
        .team_repository
        .list_active()
        .await
        .map_err(AppError::DatabaseError)?;

    Ok(ApiResponse::success(teams))
}

pub async fn get_team(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<i64>,
) -> Result<HttpResponse> {
    let team_id = path.into_inner();
    let team = load_team(&state, team_id).await?;
    require_member(&state, &ctx, team_id).await?;

    let members = state
        .team_repository
        .list_members(team_id)
        .await
        .map_err(AppError::DatabaseError)?;

    Ok(ApiResponse::success(TeamWithMembers { team, members }))
}

pub async fn update_team(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<i64>,
    input: Json<UpdateTeamInput>,
) -> Result<HttpResponse> {
    let team_id = path.into_inner();
    load_team(&state, team_id).await?;
    require_manager(&state, &ctx, team_id).await?;

    if let Some(ref name) = input.name {
        validate_team_name(name)?;
    }
    if input.subscription_type.is_some() && !ctx.is_superadmin() {
        return Err(AppError::Forbidden("Plan changes require an administrator".to_string()).into());
    }

    let team = state
        .team_repository
        .update_team(team_id, &input)
        .await
        .map_err(AppError::DatabaseError)?
        .ok_or_else(|| AppError::NotFound("Team not found".to_string()))?;

    Ok(ApiResponse::success(team))
}

pub async fn delete_team(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<i64>,
) -> Result<HttpResponse> {
    let team_id = path.into_inner();
    load_team(&state, team_id).await?;

    let membership = caller_membership(&state, &ctx, team_id).await?;
    if !membership.is_some_and(|m| m.role == TeamRole::Owner) {
        return Err(AppError::Forbidden("Only the team owner can delete a team".to_string()).into());
    }

    state
        .team_repository
        .deactivate_team(team_id)
        .await
        .map_err(AppError::DatabaseError)?;

    log::info!("User {} deleted team {}", ctx.user_id(), team_id);
    Ok(ApiResponse::ok_message("Team deleted successfully"))
}

pub async fn add_member(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<i64>,
    input: Json<AddTeamMemberInput>,
) -> Result<HttpResponse> {
    let team_id = path.into_inner();
    load_team(&state, team_id).await?;
    let caller = require_manager(&state, &ctx, team_id).await?;

    if input.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("User id is required".to_string()).into());
    }

    let caller_is_owner = caller.is_some_and(|m| m.role == TeamRole::Owner);
    if input.role == TeamRole::Owner && !caller_is_owner && !ctx.is_superadmin() {
        return Err(AppError::Forbidden("Only owners can add owners".to_string()).into());
    }

    let member = match state.team_repository.add_member(team_id, &input).await {
        Ok(member) => member,
        Err(e) if is_unique_violation(&e) => {
            return Err(
                AppError::BadRequest("User is already a member of this team".to_string()).into(),
            );
        }
        Err(e) => return Err(AppError::DatabaseError(e).into()),
    };

    log::info!(
        "User {} added {} to team {} as {}",
        ctx.user_id(),
        member.user_id,
        team_id,
        member.role
    );
    Ok(ApiResponse::created(member))
}

pub async fn list_members(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<i64>,
) -> Result<HttpResponse> {
    let team_id = path.into_inner();
    load_team(&state, team_id).await?;
    require_member(&state, &ctx, team_id).await?;

    let members = state
        .team_repository
        .list_members(team_id)
        .await
        .map_err(AppError::DatabaseError)?;

    Ok(ApiResponse::success(members))
}

pub async fn get_member(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<(i64, String)>,
) -> Result<HttpResponse> {
    let (team_id, user_id) = path.into_inner();
    load_team(&state, team_id).await?;
    require_member(&state, &ctx, team_id).await?;

    let member = state
        .team_repository
        .get_membership(team_id, &user_id)
        .await
        .map_err(AppError::DatabaseError)?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    Ok(ApiResponse::success(member))
}

pub async fn update_member(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<(i64, String)>,
    input: Json<UpdateTeamMemberInput>,
) -> Result<HttpResponse> {
    let (team_id, user_id) = path.into_inner();
    load_team(&state, team_id).await?;
    let caller = require_manager(&state, &ctx, team_id).await?;

    let existing = state
        .team_repository
        .get_membership(team_id, &user_id)
        .await
        .map_err(AppError::DatabaseError)?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    let touches_owner = existing.role == TeamRole::Owner || input.role == TeamRole::Owner;
    let caller_is_owner = caller.is_some_and(|m| m.role == TeamRole::Owner);
    if touches_owner && !caller_is_owner && !ctx.is_superadmin() {
        return Err(AppError::Forbidden("Only owners can change owner roles".to_string()).into());
    }

    if existing.role == TeamRole::Owner && input.role != TeamRole::Owner {
        ensure_another_owner(&state, team_id).await?;
    }

    let member = state
        .team_repository
        .update_member_role(team_id, &user_id, input.role)
        .await
        .map_err(AppError::DatabaseError)?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    Ok(ApiResponse::success(member))
}

pub async fn remove_member(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<(i64, String)>,
) -> Result<HttpResponse> {
    let (team_id, user_id) = path.into_inner();
    load_team(&state, team_id).await?;

    // Members may always leave on their own.
    if user_id != ctx.user_id() {
        require_manager(&state, &ctx, team_id).await?;
    }

    let existing = state
        .team_repository
        .get_membership(team_id, &user_id)
        .await
        .map_err(AppError::DatabaseError)?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    if existing.role == TeamRole::Owner {
        ensure_another_owner(&state, team_id).await?;
    }

    state
        .team_repository
        .remove_member(team_id, &user_id)
        .await
        .map_err(AppError::DatabaseError)?;

    log::info!(
        "User {} removed {} from team {}",
        ctx.user_id(),
        user_id,
        team_id
    );
    Ok(ApiResponse::ok_message("Member removed successfully"))
}

async fn ensure_another_owner(state: &AppState, team_id: i64) -> Result<(), AppError> {
    let owners = state.team_repository.count_owners(team_id).await?;
    if owners <= 1 {
        return Err(AppError::BadRequest(
            "A team must keep at least one owner".to_string(),
        ));
    }
    Ok(())
}

pub async fn get_user_teams(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<String>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    if user_id != ctx.user_id() && !ctx.is_superadmin() {
        return Err(AppError::Forbidden("You can only view your own teams".to_string()).into());
    }

    let memberships = state
        .team_repository
        .memberships_for_user(&user_id)
        .await
        .map_err(AppError::DatabaseError)?;

    Ok(ApiResponse::success(memberships))
}

/// Idempotent: returns the caller's memberships, creating their personal
/// team first if they have none.
pub async fn ensure_default_team(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<String>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    if user_id != ctx.user_id() {
        return Err(
            AppError::Forbidden("You can only set up your own default team".to_string()).into(),
        );
    }

    let memberships = state.team_service.ensure_default_team(&ctx.identity).await?;
    Ok(ApiResponse::success(memberships))
}
